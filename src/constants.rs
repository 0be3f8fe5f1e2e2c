// src/constants.rs

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Marker a response token must start with to count as a keyword.
pub const TAG_MARKER: char = '#';

pub const EXPORT_FILE_NAME: &str = "keywords.json";

// Image extensions accepted by the CLI scanner
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp"];

/// Short instruction used in minimal mode.
pub const MINIMAL_PROMPT: &str =
    "Give 5-25 keywords about this image, each starting with #, and no other information.";

/// Verbose instruction used in export mode: same contract as the minimal
/// prompt, plus in-context examples of the kind of tags we want back.
pub const VERBOSE_PROMPT: &str = "Give 5-25 keywords about this image, each starting with #, \
and no other information. Here are some examples that should give you a sense of what kind of \
words I want. #performance #audience #instruments #event #public #percussion instruments \
#banquet #singing #celebration #dinner party #formal event #photograph #cameras #makeup \
#dance #theater #dress #outdoor event #parade #martial arts #float #beauty queen #costume \
#banners #dance. Do not say here are some keywords.";
