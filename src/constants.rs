/// Application-wide constants
/// All magic numbers and constant values should be defined here

/// Maximum accepted request body in bytes (64 KiB)
pub const MAX_BODY_SIZE: usize = 64 * 1024;

/// Emoji prefix used in startup logs
pub const FOLIO_EMOJI: &str = "📬";

/// Default listen port
pub const DEFAULT_PORT: u16 = 5000;

/// Default environment label reported by /api/health
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Contact submissions allowed per identity per window
pub const RATE_LIMIT_MAX_REQUESTS: u32 = 10;

/// Rate limit window length in seconds
pub const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// How often expired rate limit windows are swept, in seconds
pub const RATE_LIMIT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Contact field bounds, in characters
pub const NAME_LEN: (usize, usize) = (2, 100);
pub const SUBJECT_LEN: (usize, usize) = (2, 150);
pub const MESSAGE_LEN: (usize, usize) = (5, 5000);
pub const EMAIL_MAX_LEN: usize = 254;

/// Prefix for the subject line of relayed messages
pub const MAIL_SUBJECT_PREFIX: &str = "Portfolio contact: ";

/// Upper bound on the startup SMTP check, in seconds
pub const SMTP_VERIFY_TIMEOUT_SECS: u64 = 10;

/// Longest edge of a normalized profile photo, in pixels
pub const PHOTO_MAX_EDGE: u32 = 768;

/// JPEG quality for normalized photos (0.85 on a 0-100 scale)
pub const PHOTO_JPEG_QUALITY: u8 = 85;

/// Media type of normalized photos
pub const PHOTO_MEDIA_TYPE: &str = "image/jpeg";

/// Key the profile photo is stored under
pub const PROFILE_PHOTO_KEY: &str = "profilePic";

/// Local photo database file, named for the application
pub const PHOTO_DB_NAME: &str = "folio-portfolio.db";

/// Bundled image shown when no photo is stored
pub const DEFAULT_PHOTO_PATH: &str = "/assets/profile-default.jpg";

/// Scheme prefix of minted display references
pub const DISPLAY_URL_PREFIX: &str = "blob:folio/";
