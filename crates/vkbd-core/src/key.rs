// Vkbd Key Codes
// Logical key identifiers produced by virtual keys

use std::fmt;
use std::str::FromStr;

use strum_macros::{EnumCount, EnumIter, EnumString, FromRepr, IntoStaticStr};

/// First code of the non-character key range.
///
/// Keys below this value carry a Unicode scalar as their code, so their text
/// is the character itself. Keys at or above it are control and function keys.
pub const SPECIAL_KEY_BASE: u32 = 0x0100_0000;

/// A logical key code.
///
/// The numeric values follow the Qt key table: printable keys use their
/// Unicode code point (letters use the uppercase form), everything else lives
/// above [`SPECIAL_KEY_BASE`]. Names parse with or without a `Key_` prefix.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    EnumString,
    IntoStaticStr,
    EnumIter,
    EnumCount,
    FromRepr,
)]
#[repr(u32)]
pub enum KeyCode {
    // Control and function keys
    Escape = 0x0100_0000,
    Tab = 0x0100_0001,
    Backtab = 0x0100_0002,
    Backspace = 0x0100_0003,
    Return = 0x0100_0004,
    Enter = 0x0100_0005,
    Insert = 0x0100_0006,
    Delete = 0x0100_0007,
    Pause = 0x0100_0008,
    Print = 0x0100_0009,
    SysReq = 0x0100_000a,
    Clear = 0x0100_000b,
    Home = 0x0100_0010,
    End = 0x0100_0011,
    Left = 0x0100_0012,
    Up = 0x0100_0013,
    Right = 0x0100_0014,
    Down = 0x0100_0015,
    PageUp = 0x0100_0016,
    PageDown = 0x0100_0017,
    Shift = 0x0100_0020,
    Control = 0x0100_0021,
    Meta = 0x0100_0022,
    Alt = 0x0100_0023,
    CapsLock = 0x0100_0024,
    NumLock = 0x0100_0025,
    ScrollLock = 0x0100_0026,
    F1 = 0x0100_0030,
    F2 = 0x0100_0031,
    F3 = 0x0100_0032,
    F4 = 0x0100_0033,
    F5 = 0x0100_0034,
    F6 = 0x0100_0035,
    F7 = 0x0100_0036,
    F8 = 0x0100_0037,
    F9 = 0x0100_0038,
    F10 = 0x0100_0039,
    F11 = 0x0100_003a,
    F12 = 0x0100_003b,
    #[strum(serialize = "Super_L")]
    SuperL = 0x0100_0053,
    #[strum(serialize = "Super_R")]
    SuperR = 0x0100_0054,
    Menu = 0x0100_0055,
    AltGr = 0x0100_1103,

    // Dead keys
    #[strum(serialize = "Dead_Grave")]
    DeadGrave = 0x0100_1250,
    #[strum(serialize = "Dead_Acute")]
    DeadAcute = 0x0100_1251,
    #[strum(serialize = "Dead_Circumflex")]
    DeadCircumflex = 0x0100_1252,
    #[strum(serialize = "Dead_Tilde")]
    DeadTilde = 0x0100_1253,
    #[strum(serialize = "Dead_Macron")]
    DeadMacron = 0x0100_1254,
    #[strum(serialize = "Dead_Breve")]
    DeadBreve = 0x0100_1255,
    #[strum(serialize = "Dead_Abovedot")]
    DeadAbovedot = 0x0100_1256,
    #[strum(serialize = "Dead_Diaeresis")]
    DeadDiaeresis = 0x0100_1257,
    #[strum(serialize = "Dead_Abovering")]
    DeadAbovering = 0x0100_1258,
    #[strum(serialize = "Dead_Doubleacute")]
    DeadDoubleacute = 0x0100_1259,
    #[strum(serialize = "Dead_Caron")]
    DeadCaron = 0x0100_125a,
    #[strum(serialize = "Dead_Cedilla")]
    DeadCedilla = 0x0100_125b,
    #[strum(serialize = "Dead_Ogonek")]
    DeadOgonek = 0x0100_125c,
    #[strum(serialize = "Dead_Iota")]
    DeadIota = 0x0100_125d,
    #[strum(serialize = "Dead_Voiced_Sound")]
    DeadVoicedSound = 0x0100_125e,
    #[strum(serialize = "Dead_Semivoiced_Sound")]
    DeadSemivoicedSound = 0x0100_125f,
    #[strum(serialize = "Dead_Belowdot")]
    DeadBelowdot = 0x0100_1260,
    #[strum(serialize = "Dead_Hook")]
    DeadHook = 0x0100_1261,
    #[strum(serialize = "Dead_Horn")]
    DeadHorn = 0x0100_1262,

    #[default]
    #[strum(serialize = "unknown")]
    Unknown = 0x01ff_ffff,

    // ASCII
    Space = 0x20,
    Exclam = 0x21,
    QuoteDbl = 0x22,
    NumberSign = 0x23,
    Dollar = 0x24,
    Percent = 0x25,
    Ampersand = 0x26,
    Apostrophe = 0x27,
    ParenLeft = 0x28,
    ParenRight = 0x29,
    Asterisk = 0x2a,
    Plus = 0x2b,
    Comma = 0x2c,
    Minus = 0x2d,
    Period = 0x2e,
    Slash = 0x2f,
    #[strum(serialize = "0")]
    Digit0 = 0x30,
    #[strum(serialize = "1")]
    Digit1 = 0x31,
    #[strum(serialize = "2")]
    Digit2 = 0x32,
    #[strum(serialize = "3")]
    Digit3 = 0x33,
    #[strum(serialize = "4")]
    Digit4 = 0x34,
    #[strum(serialize = "5")]
    Digit5 = 0x35,
    #[strum(serialize = "6")]
    Digit6 = 0x36,
    #[strum(serialize = "7")]
    Digit7 = 0x37,
    #[strum(serialize = "8")]
    Digit8 = 0x38,
    #[strum(serialize = "9")]
    Digit9 = 0x39,
    Colon = 0x3a,
    Semicolon = 0x3b,
    Less = 0x3c,
    Equal = 0x3d,
    Greater = 0x3e,
    Question = 0x3f,
    At = 0x40,
    A = 0x41,
    B = 0x42,
    C = 0x43,
    D = 0x44,
    E = 0x45,
    F = 0x46,
    G = 0x47,
    H = 0x48,
    I = 0x49,
    J = 0x4a,
    K = 0x4b,
    L = 0x4c,
    M = 0x4d,
    N = 0x4e,
    O = 0x4f,
    P = 0x50,
    Q = 0x51,
    R = 0x52,
    S = 0x53,
    T = 0x54,
    U = 0x55,
    V = 0x56,
    W = 0x57,
    X = 0x58,
    Y = 0x59,
    Z = 0x5a,
    BracketLeft = 0x5b,
    Backslash = 0x5c,
    BracketRight = 0x5d,
    AsciiCircum = 0x5e,
    Underscore = 0x5f,
    QuoteLeft = 0x60,
    BraceLeft = 0x7b,
    Bar = 0x7c,
    BraceRight = 0x7d,
    AsciiTilde = 0x7e,

    // Latin-1
    #[strum(serialize = "nobreakspace")]
    NoBreakSpace = 0xa0,
    #[strum(serialize = "exclamdown")]
    ExclamDown = 0xa1,
    #[strum(serialize = "cent")]
    Cent = 0xa2,
    #[strum(serialize = "sterling")]
    Sterling = 0xa3,
    #[strum(serialize = "currency")]
    Currency = 0xa4,
    #[strum(serialize = "yen")]
    Yen = 0xa5,
    #[strum(serialize = "brokenbar")]
    BrokenBar = 0xa6,
    #[strum(serialize = "section")]
    Section = 0xa7,
    #[strum(serialize = "diaeresis")]
    Diaeresis = 0xa8,
    #[strum(serialize = "copyright")]
    Copyright = 0xa9,
    #[strum(serialize = "ordfeminine")]
    OrdFeminine = 0xaa,
    #[strum(serialize = "guillemotleft")]
    GuillemotLeft = 0xab,
    #[strum(serialize = "notsign")]
    NotSign = 0xac,
    #[strum(serialize = "hyphen")]
    Hyphen = 0xad,
    #[strum(serialize = "registered")]
    Registered = 0xae,
    #[strum(serialize = "macron")]
    Macron = 0xaf,
    #[strum(serialize = "degree")]
    Degree = 0xb0,
    #[strum(serialize = "plusminus")]
    PlusMinus = 0xb1,
    #[strum(serialize = "twosuperior")]
    TwoSuperior = 0xb2,
    #[strum(serialize = "threesuperior")]
    ThreeSuperior = 0xb3,
    #[strum(serialize = "acute")]
    Acute = 0xb4,
    #[strum(serialize = "mu")]
    Mu = 0xb5,
    #[strum(serialize = "paragraph")]
    Paragraph = 0xb6,
    #[strum(serialize = "periodcentered")]
    PeriodCentered = 0xb7,
    #[strum(serialize = "cedilla")]
    Cedilla = 0xb8,
    #[strum(serialize = "onesuperior")]
    OneSuperior = 0xb9,
    #[strum(serialize = "masculine")]
    Masculine = 0xba,
    #[strum(serialize = "guillemotright")]
    GuillemotRight = 0xbb,
    #[strum(serialize = "onequarter")]
    OneQuarter = 0xbc,
    #[strum(serialize = "onehalf")]
    OneHalf = 0xbd,
    #[strum(serialize = "threequarters")]
    ThreeQuarters = 0xbe,
    #[strum(serialize = "questiondown")]
    QuestionDown = 0xbf,
    Agrave = 0xc0,
    Aacute = 0xc1,
    Acircumflex = 0xc2,
    Atilde = 0xc3,
    Adiaeresis = 0xc4,
    Aring = 0xc5,
    #[strum(serialize = "AE")]
    Ae = 0xc6,
    Ccedilla = 0xc7,
    Egrave = 0xc8,
    Eacute = 0xc9,
    Ecircumflex = 0xca,
    Ediaeresis = 0xcb,
    Igrave = 0xcc,
    Iacute = 0xcd,
    Icircumflex = 0xce,
    Idiaeresis = 0xcf,
    #[strum(serialize = "ETH")]
    Eth = 0xd0,
    Ntilde = 0xd1,
    Ograve = 0xd2,
    Oacute = 0xd3,
    Ocircumflex = 0xd4,
    Otilde = 0xd5,
    Odiaeresis = 0xd6,
    #[strum(serialize = "multiply")]
    Multiply = 0xd7,
    Ooblique = 0xd8,
    Ugrave = 0xd9,
    Uacute = 0xda,
    Ucircumflex = 0xdb,
    Udiaeresis = 0xdc,
    Yacute = 0xdd,
    #[strum(serialize = "THORN")]
    Thorn = 0xde,
    #[strum(serialize = "ssharp")]
    Ssharp = 0xdf,
    #[strum(serialize = "division")]
    Division = 0xf7,
    #[strum(serialize = "ydiaeresis")]
    Ydiaeresis = 0xff,
}

impl KeyCode {
    /// Get the raw numeric code value
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Get the table name of this key (without the `Key_` prefix)
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look up a key by its raw code
    pub fn from_code(code: u32) -> Option<Self> {
        Self::from_repr(code)
    }

    pub fn is_unknown(self) -> bool {
        self == KeyCode::Unknown
    }

    /// Check whether this key is one of the dead (accent) keys
    pub fn is_dead(self) -> bool {
        matches!(
            self,
            KeyCode::DeadGrave
                | KeyCode::DeadAcute
                | KeyCode::DeadCircumflex
                | KeyCode::DeadTilde
                | KeyCode::DeadMacron
                | KeyCode::DeadBreve
                | KeyCode::DeadAbovedot
                | KeyCode::DeadDiaeresis
                | KeyCode::DeadAbovering
                | KeyCode::DeadDoubleacute
                | KeyCode::DeadCaron
                | KeyCode::DeadCedilla
                | KeyCode::DeadOgonek
                | KeyCode::DeadIota
                | KeyCode::DeadVoicedSound
                | KeyCode::DeadSemivoicedSound
                | KeyCode::DeadBelowdot
                | KeyCode::DeadHook
                | KeyCode::DeadHorn
        )
    }

    /// Keys that never produce visible output
    pub fn is_silent(self) -> bool {
        matches!(
            self,
            KeyCode::Unknown
                | KeyCode::Shift
                | KeyCode::Control
                | KeyCode::Alt
                | KeyCode::Meta
                | KeyCode::SuperL
                | KeyCode::SuperR
                | KeyCode::Menu
                | KeyCode::CapsLock
                | KeyCode::NumLock
                | KeyCode::Escape
        )
    }

    /// The character this key stands for, if its code is a Unicode scalar
    pub fn to_char(self) -> Option<char> {
        let code = self.code();
        if code >= SPECIAL_KEY_BASE {
            return None;
        }
        char::from_u32(code)
    }

    /// Text produced by this key, before any case folding.
    ///
    /// Tab yields a tab character, Return/Enter a carriage return and
    /// Backspace a backspace control character. Silent keys and the remaining
    /// control keys yield an empty string.
    pub fn text(self) -> String {
        if self.is_silent() {
            return String::new();
        }
        match self {
            KeyCode::Tab => "\t".to_string(),
            KeyCode::Return | KeyCode::Enter => "\r".to_string(),
            KeyCode::Backspace => "\u{8}".to_string(),
            _ => self.to_char().map(String::from).unwrap_or_default(),
        }
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Key_{}", self.name())
    }
}

/// Parse a key name to a key code.
///
/// Accepts both `Key_Q` and `Q`. Matching is case-sensitive, as in the key
/// table (`Key_Aacute` and `Key_ydiaeresis` are distinct spellings).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    let bare = trimmed.strip_prefix("Key_").unwrap_or(trimmed);
    KeyCode::from_str(bare).ok()
}

/// Parse a key name, falling back to [`KeyCode::Unknown`] with a warning
pub fn key_from_name_or_unknown(name: &str) -> KeyCode {
    key_from_name(name).unwrap_or_else(|| {
        log::warn!("Unable to convert '{}' to a key, using Key_unknown", name);
        KeyCode::Unknown
    })
}
