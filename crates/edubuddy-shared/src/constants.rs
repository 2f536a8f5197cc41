/// Application name
pub const APP_NAME: &str = "EduBuddy";

/// Maximum uploaded file size in bytes (10 MiB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// File extensions accepted by the note upload form (lowercase, no dot)
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "txt", "ppt", "pptx"];

/// Key prefix under which uploaded note files are stored
pub const DEFAULT_UPLOAD_PREFIX: &str = "pdfs";

/// Default HTTP API port
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Chat-completion defaults for the assistant endpoint
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_CHAT_BASE_URL: &str = "https://api.openai.com/v1";
pub const CHAT_TEMPERATURE: f32 = 0.7;
pub const CHAT_MAX_TOKENS: u32 = 800;

/// Returned when the provider answers without any content
pub const CHAT_FALLBACK_REPLY: &str = "I apologize, but I couldn't process that request.";

/// Instructions prepended to every assistant conversation
pub const ASSISTANT_SYSTEM_PROMPT: &str = "You are EduBuddy, an educational assistant for college students. You have expertise in:
- Operating Systems (Process Management, Memory Management, File Systems, etc.)
- Web Technologies (HTML5, CSS3, JavaScript, Client/Server-side technologies)
- Computer Organization (Digital Logic, CPU Organization, Memory Organization)
- Data Structures and Algorithms
- Programming concepts

Always provide detailed, accurate information and include relevant study resources when appropriate.
Format your responses clearly with proper sections and bullet points when needed.
When possible, include links to GeeksForGeeks articles in markdown format: [Title](URL)";
