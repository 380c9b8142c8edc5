use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::sync::Mutex;
use ttf_parser::{Face, GlyphId};

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

const FALLBACK_ADVANCE: f64 = 0.56;
const FALLBACK_HEIGHT: f64 = 0.72;
const FALLBACK_DESCENT: f64 = 0.22;
const FALLBACK_ASCENT: f64 = 0.9;

/// Ink extents of a run of text, in user units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtents {
    pub x_bearing: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FontExtents {
    pub ascent: f64,
    pub descent: f64,
}

/// Source of text metrics for label placement.
pub trait MeasureText {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents;
    fn font_extents(&self, font_size: f64) -> FontExtents;
}

/// Proportional estimate used when no font can be loaded.
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedMetrics;

impl MeasureText for EstimatedMetrics {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
        let chars = text.chars().filter(|c| *c != '\n').count();
        if chars == 0 || font_size <= 0.0 {
            return TextExtents::default();
        }
        TextExtents {
            x_bearing: 0.0,
            width: chars as f64 * font_size * FALLBACK_ADVANCE,
            height: font_size * FALLBACK_HEIGHT,
        }
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        FontExtents {
            ascent: font_size * FALLBACK_ASCENT,
            descent: font_size * FALLBACK_DESCENT,
        }
    }
}

/// Metrics from the first installed font matching a CSS-style family list,
/// falling back to [`EstimatedMetrics`] when nothing matches.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    font_family: String,
}

impl FontMetrics {
    pub fn new(font_family: &str) -> Self {
        Self {
            font_family: font_family.to_string(),
        }
    }
}

impl MeasureText for FontMetrics {
    fn text_extents(&self, text: &str, font_size: f64) -> TextExtents {
        if text.is_empty() || font_size <= 0.0 {
            return TextExtents::default();
        }
        with_face(&self.font_family, |face| face.text_extents(text, font_size))
            .flatten()
            .unwrap_or_else(|| EstimatedMetrics.text_extents(text, font_size))
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        with_face(&self.font_family, |face| face.font_extents(font_size))
            .unwrap_or_else(|| EstimatedMetrics.font_extents(font_size))
    }
}

fn with_face<T>(font_family: &str, f: impl FnOnce(&mut FontFace) -> T) -> Option<T> {
    let mut guard = FONT_CACHE.lock().ok()?;
    guard.face(font_family).map(f)
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<FontFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn face(&mut self, font_family: &str) -> Option<&mut FontFace> {
        let family_key = normalize_family_key(font_family);
        if !self.faces.contains_key(&family_key) {
            let face = self.load_face(font_family);
            if face.is_none() {
                log::warn!("no font found for {font_family:?}; estimating text extents");
            }
            self.faces.insert(family_key.clone(), face);
        }
        self.faces.get_mut(&family_key).and_then(|face| face.as_mut())
    }

    fn load_face(&mut self, font_family: &str) -> Option<FontFace> {
        let family_key = normalize_family_key(font_family);
        if let Some(face) = load_cached_face(&family_key) {
            return Some(face);
        }

        let mut names: Vec<String> = Vec::new();
        let mut generics: Vec<Option<Family<'static>>> = Vec::new();
        for part in font_family.split(',') {
            let raw = part.trim().trim_matches('"').trim_matches('\'');
            if raw.is_empty() {
                continue;
            }
            match raw.to_ascii_lowercase().as_str() {
                "serif" => generics.push(Some(Family::Serif)),
                "sans-serif" | "system-ui" => generics.push(Some(Family::SansSerif)),
                "monospace" => generics.push(Some(Family::Monospace)),
                _ => {
                    names.push(raw.to_string());
                    generics.push(None);
                }
            }
        }
        if generics.is_empty() {
            generics.push(Some(Family::SansSerif));
        }

        let mut named = names.iter();
        let mut families: Vec<Family<'_>> = Vec::with_capacity(generics.len());
        for generic in generics {
            match generic {
                Some(family) => families.push(family),
                None => {
                    if let Some(name) = named.next() {
                        families.push(Family::Name(name.as_str()));
                    }
                }
            }
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        let mut loaded: Option<FontFace> = None;
        self.db.with_face_data(id, |data, index| {
            let bytes = data.to_vec();
            if Face::parse(&bytes, index).is_ok() {
                if let Some((font_path, meta_path)) = cache_paths(&family_key)
                    && !font_path.exists()
                {
                    if let Some(parent) = font_path.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(&font_path, &bytes);
                    let _ = fs::write(&meta_path, index.to_string());
                }
                loaded = FontFace::new(bytes, index);
            }
        });
        loaded
    }
}

struct FontFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f64,
    ascender: f64,
    descender: f64,
    glyph_cache: HashMap<char, Option<u16>>,
}

impl FontFace {
    fn new(data: Vec<u8>, index: u32) -> Option<Self> {
        let face = Face::parse(&data, index).ok()?;
        let units_per_em = f64::from(face.units_per_em().max(1));
        let ascender = f64::from(face.ascender());
        let descender = f64::from(face.descender());
        Some(Self {
            data,
            index,
            units_per_em,
            ascender,
            descender,
            glyph_cache: HashMap::new(),
        })
    }

    fn font_extents(&self, font_size: f64) -> FontExtents {
        let scale = font_size / self.units_per_em;
        FontExtents {
            ascent: self.ascender * scale,
            descent: -self.descender * scale,
        }
    }

    /// Walks the glyph advances, accumulating the ink box. `None` when the
    /// face data no longer parses.
    fn text_extents(&mut self, text: &str, font_size: f64) -> Option<TextExtents> {
        let face = Face::parse(&self.data, self.index).ok()?;
        let scale = font_size / self.units_per_em;
        let fallback = FALLBACK_ADVANCE * self.units_per_em;

        let mut pen = 0.0f64;
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;
        for ch in text.chars() {
            if ch == '\n' {
                continue;
            }
            let glyph = *self
                .glyph_cache
                .entry(ch)
                .or_insert_with(|| face.glyph_index(ch).map(|id| id.0));
            let Some(glyph_id) = glyph else {
                pen += fallback;
                continue;
            };
            let glyph_id = GlyphId(glyph_id);
            if let Some(rect) = face.glyph_bounding_box(glyph_id) {
                x_min = x_min.min(pen + f64::from(rect.x_min));
                x_max = x_max.max(pen + f64::from(rect.x_max));
                y_min = y_min.min(f64::from(rect.y_min));
                y_max = y_max.max(f64::from(rect.y_max));
            }
            pen += face.glyph_hor_advance(glyph_id).map(f64::from).unwrap_or(fallback);
        }

        if !x_min.is_finite() {
            // Whitespace only, or no outlines: advance box with no ink.
            return Some(TextExtents {
                x_bearing: 0.0,
                width: pen * scale,
                height: 0.0,
            });
        }
        Some(TextExtents {
            x_bearing: x_min * scale,
            width: (x_max - x_min) * scale,
            height: (y_max - y_min) * scale,
        })
    }
}

fn normalize_family_key(font_family: &str) -> String {
    let trimmed = font_family.trim();
    if trimmed.is_empty() {
        "sans-serif".to_string()
    } else {
        trimmed.to_string()
    }
}

fn cache_paths(family_key: &str) -> Option<(PathBuf, PathBuf)> {
    let base = std::env::var_os("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".cache")))?;
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    family_key.hash(&mut hasher);
    let hash = hasher.finish();
    let dir = base.join("tubemap").join("font-cache");
    let font_path = dir.join(format!("{hash:x}.font"));
    let meta_path = dir.join(format!("{hash:x}.meta"));
    Some((font_path, meta_path))
}

fn load_cached_face(family_key: &str) -> Option<FontFace> {
    let (font_path, meta_path) = cache_paths(family_key)?;
    if !font_path.exists() || !meta_path.exists() {
        return None;
    }
    let bytes = fs::read(font_path).ok()?;
    let index: u32 = fs::read_to_string(meta_path).ok()?.trim().parse().ok()?;
    FontFace::new(bytes, index)
}
