//! Shared constants and small enums. Pure data, no dependencies.

/// Well dimensions, in cells
pub const BOARD_COLS: u8 = 10;
pub const BOARD_ROWS: u8 = 20;

/// Timing, in milliseconds
pub const TICK_MS: u64 = 16;
pub const BASE_DROP_MS: u64 = 1000;
pub const DROP_STEP_MS: u64 = 100;
pub const DROP_FLOOR_MS: u64 = 100;

/// Line clear scoring, indexed by lines cleared in one lock event
pub const LINE_SCORES: [u32; 5] = [0, 100, 300, 500, 800];

/// Lines needed per level step
pub const LINES_PER_LEVEL: u32 = 10;

/// Content rotation constants
pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const SEEN_SET_CAP: usize = 500;
pub const REFRESH_COOLDOWN_MS: u64 = 6 * 60 * 60 * 1000;
pub const FETCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PICK_WINDOW_DAYS: u64 = 7;

/// Falling-block piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Parse a piece kind from its tag, case-insensitively.
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PieceKind::I => "i",
            PieceKind::O => "o",
            PieceKind::T => "t",
            PieceKind::S => "s",
            PieceKind::Z => "z",
            PieceKind::J => "j",
            PieceKind::L => "l",
        }
    }
}

/// One well cell: empty, or locked with the kind that filled it
pub type Cell = Option<PieceKind>;

/// Player inputs the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    MoveLeft,
    MoveRight,
    Rotate,
    SoftDrop,
    HardDrop,
    Pause,
    Restart,
}

impl GameAction {
    pub const ALL: [GameAction; 7] = [
        GameAction::MoveLeft,
        GameAction::MoveRight,
        GameAction::Rotate,
        GameAction::SoftDrop,
        GameAction::HardDrop,
        GameAction::Pause,
        GameAction::Restart,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::MoveLeft => "moveLeft",
            GameAction::MoveRight => "moveRight",
            GameAction::Rotate => "rotate",
            GameAction::SoftDrop => "softDrop",
            GameAction::HardDrop => "hardDrop",
            GameAction::Pause => "pause",
            GameAction::Restart => "restart",
        }
    }
}

/// Content types served by the batch manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Quotes,
    Stories,
    Mysteries,
    Exercises,
    WordPuzzles,
}

impl ContentKind {
    pub const ALL: [ContentKind; 5] = [
        ContentKind::Quotes,
        ContentKind::Stories,
        ContentKind::Mysteries,
        ContentKind::Exercises,
        ContentKind::WordPuzzles,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("wordpuzzles") {
            return Some(ContentKind::WordPuzzles);
        }
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Quotes => "quotes",
            ContentKind::Stories => "stories",
            ContentKind::Mysteries => "mysteries",
            ContentKind::Exercises => "exercises",
            ContentKind::WordPuzzles => "word_puzzles",
        }
    }

    /// Document name for this kind (one static JSON resource per kind)
    pub fn file_name(&self) -> &'static str {
        match self {
            ContentKind::Quotes => "quotes.json",
            ContentKind::Stories => "stories.json",
            ContentKind::Mysteries => "mysteries.json",
            ContentKind::Exercises => "exercises.json",
            ContentKind::WordPuzzles => "word_puzzles.json",
        }
    }
}
