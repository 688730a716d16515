// Crate-wide constants, error-message conventions, and small shared types
// that don't belong to any single module.

/// Width of the backing mailbox array. The playable area is 10x10, centered
/// inside a 16x16 array so off-board offsets never need bounds checks.
pub const ARR_WIDTH: i32 = 16;
pub const ARR_SIZE: usize = (ARR_WIDTH * ARR_WIDTH) as usize;
pub const BOARD_WIDTH: i32 = 10;
pub const FIL_ORIGIN: i32 = (ARR_WIDTH - BOARD_WIDTH) / 2;
pub const RNK_ORIGIN: i32 = (ARR_WIDTH - BOARD_WIDTH) / 2;
pub const NUMBER_PAWNS: usize = 7;

pub const MAX_NUM_MOVES: usize = 128;
pub const MAX_PLY_IN_SEARCH: usize = 100;

/// Invariant-violation messages. Reaching one of these means the engine's
/// internal state is corrupt; there is no sensible recovery, so we panic
/// with a fixed message instead of threading a `Result` through every call
/// site that can never actually fail given a well-formed `Position`.
pub struct ErrFatal;
impl ErrFatal {
    pub const LOCK: &'static str = "Lock failed.";
    pub const STOMPED_KING: &'static str = "Stomped a king; this can never happen.";
    pub const BAD_PAWN_LOCS: &'static str = "plocs/board disagreement detected.";
    pub const BAD_KING_LOC: &'static str = "kloc/board disagreement detected.";
    pub const NO_HISTORY: &'static str = "Repetition scan ran off the end of history.";
    pub const CHANNEL: &'static str = "Broken channel.";
}

/// Messages for boundary failures caused by bad external input, which
/// callers are expected to handle rather than us panicking on their behalf.
pub struct ErrNormal;
impl ErrNormal {
    pub const NOT_INT: &'static str = "The value given was not an integer.";
    pub const UNKNOWN_OPTION: &'static str = "Unknown configuration option.";
}

pub struct About;
impl About {
    pub const ENGINE: &'static str = "Leiserchess Core";
    pub const VERSION: &'static str = env!("CARGO_PKG_VERSION");
}
