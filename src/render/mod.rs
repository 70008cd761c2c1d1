// Output backends: the flow-layout docx writer and the fixed-layout PDF sink.

pub mod docx;
pub mod pdf;
