use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use rust_embed::{Embed, RustEmbed};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::keyboard::finger::{Finger, FingerId, Hand, UnknownFingerId};
use crate::keyboard::graph::KeyGraph;
use crate::keyboard::key::{KeyId, UnknownKeyId};

pub const DEFAULT_LAYOUT: &str = "qwerty";

#[derive(Embed)]
#[folder = "assets/boards/"]
struct BoardAssets;

#[derive(Embed)]
#[folder = "assets/layouts/"]
struct LayoutAssets;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("layout {0:?} not found")]
    LayoutNotFound(String),
    #[error("board {0:?} not found")]
    BoardNotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    UnknownKey(#[from] UnknownKeyId),
    #[error(transparent)]
    UnknownFinger(#[from] UnknownFingerId),
    #[error("key {key} is assigned to both {first} and {second}")]
    DuplicateAssignment {
        key: KeyId,
        first: FingerId,
        second: FingerId,
    },
    #[error("key {0} appears more than once on the board")]
    DuplicateKey(KeyId),
    #[error("key {0} on the board is not assigned to any finger")]
    Unassigned(KeyId),
    #[error("key {0} is not on the board")]
    OffBoard(KeyId),
    #[error("home key {key} of {finger} is outside its cluster")]
    HomeOutsideCluster { finger: FingerId, key: KeyId },
    #[error("symbols for {0} must be one or two single characters")]
    BadSymbol(KeyId),
}

/// Physical board file: grid geometry, finger clusters and home keys.
#[derive(Debug, Deserialize)]
struct BoardFile {
    name: String,
    rows: Vec<Vec<String>>,
    fingers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    home: BTreeMap<String, String>,
}

/// Layout variant file: which characters each physical key produces.
#[derive(Debug, Deserialize)]
struct LayoutFile {
    name: String,
    board: String,
    symbols: BTreeMap<String, Vec<String>>,
}

/// Immutable keyboard description shared by the lesson and navigation code.
///
/// Built once per session and passed around by reference; nothing in here
/// changes after loading.
#[derive(Clone, Debug)]
pub struct KeyboardLayout {
    name: String,
    board: String,
    rows: Vec<Vec<Option<KeyId>>>,
    positions: HashMap<KeyId, (usize, usize)>,
    owners: HashMap<KeyId, FingerId>,
    clusters: BTreeMap<FingerId, Vec<KeyId>>,
    home_keys: HashMap<FingerId, KeyId>,
    symbols: HashMap<char, BTreeSet<KeyId>>,
    producers: HashMap<char, KeyId>,
    graph: KeyGraph,
}

impl KeyboardLayout {
    /// Load a layout by name, preferring `<config_dir>/keyguide/layouts/<name>.toml`
    /// over the bundled layouts.
    pub fn load(name: &str) -> Result<Self, LayoutError> {
        let user_dir = dirs::config_dir().map(|dir| dir.join("keyguide"));
        Self::load_with_user_dir(user_dir.as_deref(), name)
    }

    pub fn load_with_user_dir(user_dir: Option<&Path>, name: &str) -> Result<Self, LayoutError> {
        let layout_src = read_asset::<LayoutAssets>(user_dir, "layouts", name)?
            .ok_or_else(|| LayoutError::LayoutNotFound(name.to_string()))?;
        let layout: LayoutFile = parse(name, &layout_src)?;
        let board_src = read_asset::<BoardAssets>(user_dir, "boards", &layout.board)?
            .ok_or_else(|| LayoutError::BoardNotFound(layout.board.clone()))?;
        Self::build(parse(&layout.board, &board_src)?, layout)
    }

    pub fn from_toml(board_src: &str, layout_src: &str) -> Result<Self, LayoutError> {
        let board: BoardFile = parse("board", board_src)?;
        let layout: LayoutFile = parse("layout", layout_src)?;
        Self::build(board, layout)
    }

    pub fn bundled_layouts() -> Vec<String> {
        let mut names: Vec<String> = LayoutAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }

    /// Bundled layouts plus any `<user_dir>/layouts/*.toml`, sorted, no repeats.
    pub fn available_layouts(user_dir: Option<&Path>) -> Vec<String> {
        let mut names = Self::bundled_layouts();
        if let Some(entries) = user_dir.and_then(|dir| fs::read_dir(dir.join("layouts")).ok()) {
            names.extend(entries.filter_map(|entry| {
                let path = entry.ok()?.path();
                if path.extension()? != "toml" {
                    return None;
                }
                Some(path.file_stem()?.to_string_lossy().into_owned())
            }));
        }
        names.sort();
        names.dedup();
        names
    }

    fn build(board: BoardFile, layout: LayoutFile) -> Result<Self, LayoutError> {
        let mut rows = Vec::with_capacity(board.rows.len());
        let mut positions = HashMap::new();
        for (row_idx, row) in board.rows.iter().enumerate() {
            let mut cells = Vec::with_capacity(row.len());
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    cells.push(None);
                    continue;
                }
                let key: KeyId = cell.parse()?;
                if positions.insert(key, (row_idx, col_idx)).is_some() {
                    return Err(LayoutError::DuplicateKey(key));
                }
                cells.push(Some(key));
            }
            rows.push(cells);
        }

        let mut owners = HashMap::new();
        let mut clusters = BTreeMap::new();
        for (finger_name, keys) in &board.fingers {
            let finger: FingerId = finger_name.parse()?;
            let mut cluster = Vec::with_capacity(keys.len());
            for key_name in keys {
                let key: KeyId = key_name.parse()?;
                if !positions.contains_key(&key) {
                    return Err(LayoutError::OffBoard(key));
                }
                if let Some(first) = owners.insert(key, finger) {
                    return Err(LayoutError::DuplicateAssignment {
                        key,
                        first,
                        second: finger,
                    });
                }
                cluster.push(key);
            }
            clusters.insert(finger, cluster);
        }
        if let Some(&key) = positions.keys().find(|key| !owners.contains_key(key)) {
            return Err(LayoutError::Unassigned(key));
        }

        let mut home_keys = HashMap::new();
        for (finger_name, key_name) in &board.home {
            let finger: FingerId = finger_name.parse()?;
            let key: KeyId = key_name.parse()?;
            if owners.get(&key) != Some(&finger) {
                return Err(LayoutError::HomeOutsideCluster { finger, key });
            }
            home_keys.insert(finger, key);
        }

        let mut symbols = HashMap::new();
        let mut producers = HashMap::new();
        for (key_name, chars) in &layout.symbols {
            let key: KeyId = key_name.parse()?;
            let Some(&owner) = owners.get(&key) else {
                return Err(LayoutError::OffBoard(key));
            };
            if chars.is_empty() || chars.len() > 2 {
                return Err(LayoutError::BadSymbol(key));
            }
            for (level, text) in chars.iter().enumerate() {
                let mut it = text.chars();
                let (Some(ch), None) = (it.next(), it.next()) else {
                    return Err(LayoutError::BadSymbol(key));
                };
                let required = if level == 0 {
                    BTreeSet::from([key])
                } else {
                    BTreeSet::from([shift_for_hand(owner.hand), key])
                };
                if symbols.contains_key(&ch) {
                    warn!(
                        layout = %layout.name,
                        %key,
                        ?ch,
                        "symbol produced by more than one key, keeping the first"
                    );
                    continue;
                }
                symbols.insert(ch, required);
                producers.insert(ch, key);
            }
        }

        let graph = KeyGraph::from_grid(&rows);
        debug!(
            layout = %layout.name,
            board = %board.name,
            keys = positions.len(),
            symbols = symbols.len(),
            "keyboard layout loaded"
        );

        Ok(Self {
            name: layout.name,
            board: board.name,
            rows,
            positions,
            owners,
            clusters,
            home_keys,
            symbols,
            producers,
            graph,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn board_name(&self) -> &str {
        &self.board
    }

    pub fn rows(&self) -> &[Vec<Option<KeyId>>] {
        &self.rows
    }

    pub fn graph(&self) -> &KeyGraph {
        &self.graph
    }

    /// Grid coordinate `(row, column)` of a key.
    pub fn position(&self, key: KeyId) -> Option<(usize, usize)> {
        self.positions.get(&key).copied()
    }

    /// Owning finger of a key. Space always counts as the left thumb.
    pub fn finger_for_key(&self, key: KeyId) -> Option<FingerId> {
        if key == KeyId::Space {
            return Some(FingerId::new(Hand::Left, Finger::Thumb));
        }
        self.owners.get(&key).copied()
    }

    /// Every key assigned to `finger`, in board-file order.
    pub fn cluster(&self, finger: FingerId) -> &[KeyId] {
        self.clusters.get(&finger).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn home_key(&self, finger: FingerId) -> Option<KeyId> {
        self.home_keys.get(&finger).copied()
    }

    /// Keys that must be held together to type `ch`. Empty when the layout
    /// cannot produce the character.
    pub fn required_keys(&self, ch: char) -> BTreeSet<KeyId> {
        self.symbols.get(&ch).cloned().unwrap_or_default()
    }

    pub fn can_type(&self, ch: char) -> bool {
        self.symbols.contains_key(&ch)
    }

    /// The physical (non-modifier) key that produces `ch`, shifted or not.
    pub fn key_for_char(&self, ch: char) -> Option<KeyId> {
        self.producers.get(&ch).copied()
    }

    /// Shift used for capitals on `key`: the one on the opposite hand.
    pub fn shift_for_key(&self, key: KeyId) -> KeyId {
        let hand = self.owners.get(&key).map(|f| f.hand).unwrap_or(Hand::Right);
        shift_for_hand(hand)
    }
}

fn shift_for_hand(hand: Hand) -> KeyId {
    match hand {
        Hand::Left => KeyId::ShiftRight,
        Hand::Right => KeyId::ShiftLeft,
    }
}

fn parse<T: serde::de::DeserializeOwned>(name: &str, src: &str) -> Result<T, LayoutError> {
    toml::from_str(src).map_err(|source| LayoutError::Parse {
        name: name.to_string(),
        source,
    })
}

fn read_asset<A: RustEmbed>(
    user_dir: Option<&Path>,
    kind: &str,
    name: &str,
) -> Result<Option<String>, LayoutError> {
    let filename = format!("{name}.toml");

    if let Some(dir) = user_dir {
        let path = dir.join(kind).join(&filename);
        if path.exists() {
            return fs::read_to_string(&path)
                .map(Some)
                .map_err(|source| LayoutError::Io { path, source });
        }
    }

    Ok(A::get(&filename).and_then(|file| String::from_utf8(file.data.into_owned()).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use KeyId::*;

    fn qwerty() -> KeyboardLayout {
        KeyboardLayout::load_with_user_dir(None, "qwerty").unwrap()
    }

    const TINY_BOARD: &str = r#"
name = "tiny"
rows = [
    ["KeyQ", "KeyW", "KeyE"],
    ["KeyA", "", "KeyD"],
    ["ShiftLeft", "ShiftRight"],
]

[fingers]
L5 = ["KeyQ", "KeyA", "ShiftLeft"]
L4 = ["KeyW"]
R2 = ["KeyE", "KeyD", "ShiftRight"]

[home]
L5 = "KeyA"
R2 = "KeyD"
"#;

    const TINY_LAYOUT: &str = r#"
name = "tiny"
board = "tiny"

[symbols]
KeyQ = ["q", "Q"]
KeyA = ["a", "A"]
KeyD = ["d"]
"#;

    #[test]
    fn test_bundled_layouts_load() {
        let names = KeyboardLayout::bundled_layouts();
        assert_eq!(names, vec!["colemak", "dvorak", "qwerty"]);
        for name in names {
            let layout = KeyboardLayout::load_with_user_dir(None, &name).unwrap();
            assert_eq!(layout.board_name(), "ansi");
            for ch in 'a'..='z' {
                assert!(layout.can_type(ch), "{name} cannot type {ch:?}");
                assert!(layout.can_type(ch.to_ascii_uppercase()));
            }
            assert!(layout.can_type(' '));
        }
    }

    #[test]
    fn test_unknown_layout() {
        assert!(matches!(
            KeyboardLayout::load_with_user_dir(None, "azerty-ish"),
            Err(LayoutError::LayoutNotFound(_))
        ));
    }

    #[test]
    fn test_qwerty_fingers() {
        let layout = qwerty();
        assert_eq!(layout.finger_for_key(KeyR).unwrap().to_string(), "L2");
        assert_eq!(layout.finger_for_key(KeyF).unwrap().to_string(), "L2");
        assert_eq!(layout.finger_for_key(KeyN).unwrap().to_string(), "R2");
        assert_eq!(layout.finger_for_key(ShiftLeft).unwrap().to_string(), "L5");
        assert_eq!(layout.finger_for_key(ShiftRight).unwrap().to_string(), "R5");
        assert_eq!(layout.finger_for_key(Space).unwrap().to_string(), "L1");
    }

    #[test]
    fn test_qwerty_home_keys_and_clusters() {
        let layout = qwerty();
        let l2: FingerId = "L2".parse().unwrap();
        assert_eq!(layout.home_key(l2), Some(KeyF));
        assert!(layout.cluster(l2).contains(&KeyR));
        assert!(layout.cluster(l2).contains(&KeyB));
        assert!(!layout.cluster(l2).contains(&KeyY));
        let rb: FingerId = "RB".parse().unwrap();
        assert_eq!(layout.home_key(rb), None);
    }

    #[test]
    fn test_required_keys() {
        let layout = qwerty();
        assert_eq!(layout.required_keys('r'), BTreeSet::from([KeyR]));
        assert_eq!(layout.required_keys('T'), BTreeSet::from([ShiftRight, KeyT]));
        assert_eq!(layout.required_keys('N'), BTreeSet::from([ShiftLeft, KeyN]));
        assert_eq!(layout.required_keys('!'), BTreeSet::from([ShiftRight, Digit1]));
        assert_eq!(layout.required_keys(' '), BTreeSet::from([Space]));
        assert!(layout.required_keys('ß').is_empty());
    }

    #[test]
    fn test_key_for_char() {
        let layout = qwerty();
        assert_eq!(layout.key_for_char('a'), Some(KeyA));
        assert_eq!(layout.key_for_char('A'), Some(KeyA));
        assert_eq!(layout.key_for_char('?'), Some(Slash));
        assert_eq!(layout.key_for_char('ß'), None);
    }

    #[test]
    fn test_dvorak_maps_chars_to_physical_keys() {
        let layout = KeyboardLayout::load_with_user_dir(None, "dvorak").unwrap();
        // Dvorak 'o' sits on the QWERTY 's' position, still the left ring finger.
        assert_eq!(layout.key_for_char('o'), Some(KeyS));
        assert_eq!(layout.finger_for_key(KeyS).unwrap().to_string(), "L4");
    }

    #[test]
    fn test_positions_match_rows() {
        let layout = qwerty();
        for (r, row) in layout.rows().iter().enumerate() {
            for (c, key) in row.iter().enumerate() {
                if let Some(key) = key {
                    assert_eq!(layout.position(*key), Some((r, c)));
                }
            }
        }
        assert_eq!(layout.position(KeyF), Some((2, 4)));
        assert_eq!(layout.position(KeyR), Some((1, 4)));
    }

    #[test]
    fn test_every_board_key_has_one_finger() {
        let layout = qwerty();
        let clustered: usize = FingerId::ALL.iter().map(|f| layout.cluster(*f).len()).sum();
        let on_board = layout.rows().iter().flatten().flatten().count();
        assert_eq!(clustered, on_board);
    }

    #[test]
    fn test_from_toml_with_gap() {
        let layout = KeyboardLayout::from_toml(TINY_BOARD, TINY_LAYOUT).unwrap();
        assert_eq!(layout.rows()[1], vec![Some(KeyA), None, Some(KeyD)]);
        assert_eq!(layout.graph().neighbors(KeyA), &[KeyQ, ShiftLeft]);
        assert_eq!(layout.required_keys('Q'), BTreeSet::from([ShiftRight, KeyQ]));
        assert!(!layout.can_type('D'));
    }

    #[test]
    fn test_rejects_unassigned_key() {
        let board = TINY_BOARD.replace("L4 = [\"KeyW\"]\n", "");
        assert!(matches!(
            KeyboardLayout::from_toml(&board, TINY_LAYOUT),
            Err(LayoutError::Unassigned(KeyW))
        ));
    }

    #[test]
    fn test_rejects_double_assignment() {
        let board = TINY_BOARD.replace("L4 = [\"KeyW\"]", "L4 = [\"KeyW\", \"KeyQ\"]");
        assert!(matches!(
            KeyboardLayout::from_toml(&board, TINY_LAYOUT),
            Err(LayoutError::DuplicateAssignment { key: KeyQ, .. })
        ));
    }

    #[test]
    fn test_rejects_home_outside_cluster() {
        let board = TINY_BOARD.replace("R2 = \"KeyD\"", "R2 = \"KeyA\"");
        assert!(matches!(
            KeyboardLayout::from_toml(&board, TINY_LAYOUT),
            Err(LayoutError::HomeOutsideCluster { key: KeyA, .. })
        ));
    }

    #[test]
    fn test_rejects_bad_symbol() {
        let layout = TINY_LAYOUT.replace("[\"d\"]", "[\"dd\"]");
        assert!(matches!(
            KeyboardLayout::from_toml(TINY_BOARD, &layout),
            Err(LayoutError::BadSymbol(KeyD))
        ));
    }

    #[test]
    fn test_rejects_unknown_key_name() {
        let layout = TINY_LAYOUT.replace("KeyD = ", "KeyDD = ");
        assert!(matches!(
            KeyboardLayout::from_toml(TINY_BOARD, &layout),
            Err(LayoutError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_user_layout_overrides_bundled() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::create_dir_all(dir.path().join("boards")).unwrap();
        fs::write(dir.path().join("boards").join("tiny.toml"), TINY_BOARD).unwrap();
        fs::write(dir.path().join("layouts").join("qwerty.toml"), TINY_LAYOUT).unwrap();

        let layout = KeyboardLayout::load_with_user_dir(Some(dir.path()), "qwerty").unwrap();
        assert_eq!(layout.name(), "tiny");
        assert_eq!(layout.board_name(), "tiny");

        // Layouts not present in the user dir still come from the bundle.
        let dvorak = KeyboardLayout::load_with_user_dir(Some(dir.path()), "dvorak").unwrap();
        assert_eq!(dvorak.board_name(), "ansi");
    }

    #[test]
    fn test_available_layouts_include_user_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("layouts")).unwrap();
        fs::write(dir.path().join("layouts").join("workman.toml"), TINY_LAYOUT).unwrap();
        fs::write(dir.path().join("layouts").join("qwerty.toml"), TINY_LAYOUT).unwrap();
        fs::write(dir.path().join("layouts").join("notes.txt"), "").unwrap();

        let names = KeyboardLayout::available_layouts(Some(dir.path()));
        assert_eq!(names, vec!["colemak", "dvorak", "qwerty", "workman"]);
        assert_eq!(KeyboardLayout::available_layouts(None), KeyboardLayout::bundled_layouts());
    }
}
