/// Hard limits for device-file uploads, mirrored by the mobile client.
pub const MAX_UPLOAD_FILES: usize = 5;
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

pub const ALLOWED_IMAGE_MIMES: [&str; 3] = ["image/jpeg", "image/png", "image/gif"];

// Machine-readable upload rejection codes.
pub const LIMIT_FILE_SIZE: &str = "LIMIT_FILE_SIZE";
pub const LIMIT_FILE_COUNT: &str = "LIMIT_FILE_COUNT";
pub const LIMIT_UNEXPECTED_FILE: &str = "LIMIT_UNEXPECTED_FILE";

/// Route prefix under which stored uploads are served back.
pub const UPLOADS_PREFIX: &str = "/uploads";
