//! User-facing notices and confirmation, kept behind traits so any front end
//! can present them.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    UploadSucceeded,
    UploadFailed,
    NoFileSelected,
    DeleteSucceeded,
    DeleteFailed,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::UploadSucceeded => "File uploaded successfully!",
            Notice::UploadFailed => "Failed to upload file. Please try again.",
            Notice::NoFileSelected => "Please select a file before uploading.",
            Notice::DeleteSucceeded => "Document deleted successfully.",
            Notice::DeleteFailed => "Failed to delete document. Please try again.",
        }
    }

    pub fn is_failure(self) -> bool {
        matches!(self, Notice::UploadFailed | Notice::DeleteFailed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Asks the user a yes/no question. `false` means declined.
pub trait ConfirmPrompt: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Approves everything without asking.
pub struct AssumeYes;

impl ConfirmPrompt for AssumeYes {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}
