use serde_json::{Map, Value};

/// Read-only view over a report document.
///
/// Every field is optional: stored reports are read back leniently, and a
/// section with the wrong shape reads as empty instead of failing. `None`
/// means the key was absent or `null`; an empty string is kept as `Some("")`
/// so callers can tell the two apart even though rendering treats them alike.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HardwareReport {
    pub report_id: Option<String>,
    pub timestamp: Option<String>,
    pub system: SystemInfo,
    pub processor: ProcessorInfo,
    pub memory: MemoryInfo,
    pub graphics: Vec<GraphicsDevice>,
    pub storage_controllers: Vec<StorageController>,
    pub user_notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    /// First set value of `vendor`, `manufacturer`, `brand`.
    pub vendor: Option<String>,
    /// First set value of `model`, `product`, `name`.
    pub model: Option<String>,
    pub os_release: Option<String>,
    pub kernel: Option<String>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorInfo {
    pub model: Option<String>,
    pub name: Option<String>,
    pub cores: Option<Value>,
    summary: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryInfo {
    pub total_gb: Option<Value>,
    pub total: Option<String>,
    pub modules: Vec<MemoryModule>,
    summary: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryModule {
    pub size: Option<String>,
    pub speed: Option<String>,
    pub configured_speed: Option<String>,
    pub manufacturer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphicsDevice {
    pub device: Option<String>,
    pub driver: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StorageController {
    pub device: Option<String>,
}

impl HardwareReport {
    pub fn from_document(doc: &Map<String, Value>) -> Self {
        Self {
            report_id: text_of(doc.get("report_id")),
            timestamp: text_of(doc.get("timestamp")),
            system: SystemInfo::from_object(object(doc.get("system"))),
            processor: ProcessorInfo::from_object(object(doc.get("processor"))),
            memory: MemoryInfo::from_object(object(doc.get("memory"))),
            graphics: list(doc.get("graphics"))
                .map(|g| GraphicsDevice::from_object(object(Some(g))))
                .collect(),
            storage_controllers: list(doc.get("storage_controllers"))
                .map(|c| StorageController::from_object(object(Some(c))))
                .collect(),
            user_notes: text_of(doc.get("user_notes")),
        }
    }

    /// Names of every graphics device that reports one, in submission order.
    pub fn gpu_names(&self) -> Vec<&str> {
        self.graphics
            .iter()
            .filter_map(|g| g.device.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl SystemInfo {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            vendor: first_truthy(obj, &["vendor", "manufacturer", "brand"]),
            model: first_truthy(obj, &["model", "product", "name"]),
            os_release: text_of(obj.get("os_release")),
            kernel: text_of(obj.get("kernel")),
            platform: text_of(obj.get("platform")),
        }
    }

    /// Vendor and model joined by a space, empty parts dropped.
    pub fn label(&self) -> String {
        [self.vendor.as_deref(), self.model.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl ProcessorInfo {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            model: text_of(obj.get("model")),
            name: text_of(obj.get("name")),
            cores: present(obj.get("cores")),
            summary: summary_of(obj, &["model", "name"]),
        }
    }

    /// `model`, else `name`.
    pub fn label(&self) -> String {
        self.summary.clone()
    }
}

impl MemoryInfo {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            total_gb: present(obj.get("total_gb")),
            total: text_of(obj.get("total")),
            modules: list(obj.get("modules"))
                .map(|m| MemoryModule::from_object(object(Some(m))))
                .collect(),
            summary: summary_of(obj, &["total_gb", "total"]),
        }
    }

    /// `total_gb`, else `total`.
    pub fn label(&self) -> String {
        self.summary.clone()
    }
}

impl MemoryModule {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            size: text_of(obj.get("size")),
            speed: text_of(obj.get("speed")),
            configured_speed: text_of(obj.get("configured_speed")),
            manufacturer: text_of(obj.get("manufacturer")),
        }
    }
}

impl GraphicsDevice {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            device: text_of(obj.get("device")),
            driver: text_of(obj.get("driver")),
        }
    }
}

impl StorageController {
    fn from_object(obj: Option<&Map<String, Value>>) -> Self {
        let Some(obj) = obj else {
            return Self::default();
        };
        Self {
            device: text_of(obj.get("device")),
        }
    }
}

/// Display text of a scalar. `None` for a missing key or `null`; containers
/// fall back to their compact JSON form.
pub fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

fn present(value: Option<&Value>) -> Option<Value> {
    match value {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

fn object(value: Option<&Value>) -> Option<&Map<String, Value>> {
    value.and_then(Value::as_object)
}

fn list(value: Option<&Value>) -> impl Iterator<Item = &Value> {
    value
        .and_then(Value::as_array)
        .map(|a| a.as_slice())
        .unwrap_or_default()
        .iter()
}

/// False for the values a label lookup skips over: null, `false`, zero and
/// empty strings, lists or objects.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

fn first_truthy(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| truthy(v))
        .and_then(|v| text_of(Some(v)))
}

fn summary_of(obj: &Map<String, Value>, keys: &[&str]) -> String {
    first_truthy(obj, keys)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}
