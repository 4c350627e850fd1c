mod hardware;
mod report;

pub use hardware::{
    GraphicsDevice, HardwareReport, MemoryInfo, MemoryModule, ProcessorInfo, StorageController,
    SystemInfo, text_of,
};
pub use report::{ReportId, ValidatedReport, is_report_id};
