pub mod credential_file;
pub mod docx;
pub mod gemini;

pub use credential_file::FileCredentialStore;
pub use docx::DocxWriter;
pub use gemini::GeminiAdapter;
