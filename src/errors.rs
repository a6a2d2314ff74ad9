use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum OmFilesRsError {
    #[error("Invalid compression type")]
    InvalidCompressionType,
    #[error("Invalid data type")]
    InvalidDataType,
    #[error(
        "Descriptor region too short: need at least {needed} bytes to read this field, region is {available}"
    )]
    DescriptorTooShort { needed: usize, available: usize },
}
