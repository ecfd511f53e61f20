//! Shared constants/setters for things
//!

/// Default base URL of the generative-text provider.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Model used for quote generation.
pub const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Default base URL of the photo-search provider.
pub const PEXELS_API_BASE: &str = "https://api.pexels.com";

/// Quote returned by the proxy when the upstream payload carries no candidate
/// text.
pub const NO_QUOTE_RETURNED: &str = "No quote returned";

/// Quote shown by the view when the proxy's `quote` field is empty or absent.
pub const NO_QUOTE_FOUND: &str = "No quote found.";

/// Client-facing message when the `prompt` field is missing or not a string.
pub const PROMPT_REQUIRED: &str = "Prompt is required";

/// Client-facing message when the text provider credential is absent.
pub const GEMINI_KEY_MISSING: &str = "Gemini API key not set";

/// Client-facing message when the photo provider credential is absent.
pub const PEXELS_KEY_MISSING: &str = "Missing API key";

/// Fallback message when an upstream error body carries no message.
pub const UNKNOWN_UPSTREAM_ERROR: &str = "Unknown error";

/// Client-facing message for any other quote proxy fault.
pub const QUOTE_FETCH_FAILED: &str = "Failed to fetch quote";

/// Client-facing message for any image proxy fault.
pub const IMAGE_FETCH_FAILED: &str = "Failed to fetch image";

/// Manual-draw canvas width in pixels.
pub const CANVAS_WIDTH: u32 = 800;

/// Manual-draw canvas height in pixels.
pub const CANVAS_HEIGHT: u32 = 400;

/// Horizontal margin on each side of the wrapped quote text.
pub const TEXT_MARGIN: u32 = 50;

/// Baseline of the first wrapped quote line.
pub const TEXT_TOP: f32 = 100.0;

/// Vertical distance between wrapped quote baselines at the default size.
pub const LINE_HEIGHT: f32 = 30.0;

/// Default quote text size in pixels.
pub const QUOTE_PX: f32 = 24.0;

/// Smallest size the overflow stepping may shrink the quote text to.
pub const QUOTE_PX_FLOOR: f32 = 12.0;

/// Lowest baseline the wrapped quote block may reach on the manual canvas.
pub const QUOTE_REGION_BOTTOM: f32 = 340.0;

/// Theme label text size in pixels.
pub const LABEL_PX: f32 = 16.0;

/// Attribution line text size in pixels.
pub const ATTRIBUTION_PX: f32 = 8.0;

/// Attribution drawn at the bottom of every exported card.
pub const ATTRIBUTION: &str = "Generated with the AI Quote Generator";

/// On-screen card width reproduced by the snapshot strategy.
pub const CARD_WIDTH: u32 = 576;

/// On-screen card height reproduced by the snapshot strategy.
pub const CARD_HEIGHT: u32 = 288;

/// The snapshot strategy renders the card at this scale.
pub const SNAPSHOT_SCALE: u32 = 2;

/// File name used by the snapshot strategy.
pub const SNAPSHOT_FILE_NAME: &str = "quote-card.png";
