mod scan;

pub use scan::{RecognitionResult, ScanRecord};
