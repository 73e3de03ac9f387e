/// Default working resolution (width) for tables and matrices.
pub const DEFAULT_WIDTH: usize = 640;

/// Default working resolution (height) for tables and matrices.
pub const DEFAULT_HEIGHT: usize = 320;

/// Default horizontal field of view in degrees (Oculus Rift headset).
pub const DEFAULT_HFOV_DEG: f64 = 80.65347;

/// Default vertical field of view in degrees.
pub const DEFAULT_VFOV_DEG: f64 = 180.0;

/// Number of evenly spaced horizontal viewing centers swept across the width.
pub const DEFAULT_CENTER_STEPS: usize = 40;

/// Default difference-suppression threshold. Clips without foreground
/// foliage work well around 0.015; wind-blown trees need roughly 0.2.
pub const DEFAULT_THRESHOLD: f64 = 0.015;

/// Full longitude span of an equirectangular frame, in degrees.
pub const LONGITUDE_SPAN_DEG: f64 = 360.0;

/// Full latitude span of an equirectangular frame, in degrees.
pub const LATITUDE_SPAN_DEG: f64 = 180.0;

/// Maximum 8-bit sample value, used to normalize intensities to [0, 1].
pub const MAX_SAMPLE_VALUE: f64 = 255.0;

/// Value of a set pixel in a binary edge mask.
pub const EDGE_MASK_ON: u8 = 255;

/// Decimal places used when rendering viewing centers into cache paths.
pub const CENTER_PATH_DECIMALS: usize = 3;

/// Name of the per-clip directory holding extracted frames.
pub const FRAMES_DIR_NAME: &str = "frames";

/// Name of the per-clip directory holding edge masks.
pub const EDGES_DIR_NAME: &str = "edges";

/// Name of the per-clip cache directory for tables and matrices.
pub const CACHE_DIR_NAME: &str = "preprocess";

/// Name of the cost-matrix subdirectory inside the cache directory.
pub const COSTS_DIR_NAME: &str = "costs";
