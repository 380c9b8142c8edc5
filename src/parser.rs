use crate::config::Config;
use crate::error::{LoadError, ParseError};
use crate::geometry::{Direction, Vector2};
use crate::map::{FALLBACK_LINE, Line, PlatformId, Station, StationKind, Track, TubeMap};
use crate::stroke::PlatformSide;
use crate::surface::Color;
use anyhow::Context;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;

const NUMBER: &str = r"[-+]?(?:\d+\.?\d*|\.\d+)";

static COORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"^(?:(?P<rel>[^,\s]+),)?(?P<x>{NUMBER}),(?P<y>{NUMBER})$"
    ))
    .unwrap()
});
static PLATFORM_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<station>[^-\s]+)-(?P<number>[^\s!]+)(?P<reverse>!)?$").unwrap());
static LABEL_OFFSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<x>[-+]?\d+),(?P<y>[-+]?\d+)$").unwrap());

/// Reads and parses a map file.
pub fn load_map(path: &Path, config: &Config) -> anyhow::Result<TubeMap> {
    let source = fs::read_to_string(path).with_context(|| format!("reading map {}", path.display()))?;
    let map = parse_map(&source, config).with_context(|| format!("parsing map {}", path.display()))?;
    log::debug!(
        "loaded {}: {} lines, {} stations, {} tracks",
        path.display(),
        map.lines().len(),
        map.stations().len(),
        map.tracks().len()
    );
    Ok(map)
}

/// Parses the line-oriented map format. Blank lines and `#` comments are
/// skipped; the first bad directive aborts with its line number.
pub fn parse_map(input: &str, config: &Config) -> Result<TubeMap, LoadError> {
    let mut parser = MapParser::new(config);
    for (index, raw) in input.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        parser
            .directive(line)
            .map_err(|err| LoadError::new(index + 1, err))?;
    }
    Ok(parser.finish())
}

struct MapParser<'a> {
    config: &'a Config,
    map: TubeMap,
    last_station: Option<usize>,
    draw_first: Vec<usize>,
    draw_last: Vec<usize>,
}

impl<'a> MapParser<'a> {
    fn new(config: &'a Config) -> Self {
        Self {
            config,
            map: TubeMap::new(),
            last_station: None,
            draw_first: Vec::new(),
            draw_last: Vec::new(),
        }
    }

    fn finish(mut self) -> TubeMap {
        for id in self.draw_first {
            self.map.move_to_front(id);
        }
        for id in self.draw_last {
            self.map.move_to_back(id);
        }
        self.map
    }

    fn directive(&mut self, line: &str) -> Result<(), ParseError> {
        let mut tokens = line.split_whitespace();
        let keyword = tokens.next().unwrap_or_default();
        let args: Vec<&str> = tokens.collect();
        match keyword {
            "line" => self.line(&args),
            "track" => self.track(&args, false),
            "subtrack" => self.track(&args, true),
            "platform" => self.platform(&args),
            "draw" => self.draw(&args),
            "label" => self.label(&args),
            "label_offset" => self.label_offset(&args),
            other => match StationKind::from_keyword(other) {
                Some(kind) => self.station(kind, &args),
                None => Err(ParseError::UnknownDirective(other.to_string())),
            },
        }
    }

    fn line(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let code = args.first().ok_or(ParseError::Missing("line code"))?;
        let colors = args
            .get(1)
            .ok_or(ParseError::Missing("line colors"))?
            .split(',')
            .map(Color::from_hex)
            .collect::<Result<Vec<_>, _>>()?;
        self.map.add_line(Line::new(code, colors));
        Ok(())
    }

    fn station(&mut self, kind: StationKind, args: &[&str]) -> Result<(), ParseError> {
        let code = args.first().ok_or(ParseError::Missing("station code"))?;
        let coord_index = args
            .iter()
            .skip(1)
            .position(|token| token.contains(','))
            .map(|index| index + 1)
            .ok_or(ParseError::Missing("station coordinates"))?;
        let name = args[1..coord_index].join(" ");
        if coord_index + 1 < args.len() {
            log::debug!("ignoring trailing tokens after station {code}");
        }

        let token = args[coord_index];
        let caps = COORD_RE
            .captures(token)
            .ok_or_else(|| ParseError::BadCoordinates(token.to_string()))?;
        let relative_to = match caps.name("rel") {
            Some(rel) => Some(
                self.map
                    .station_id(rel.as_str())
                    .ok_or_else(|| ParseError::UnknownStation(rel.as_str().to_string()))?,
            ),
            None => None,
        };
        let scale = self.config.render.coordinate_scale;
        let offset = Vector2::new(number(&caps["x"], token)?, number(&caps["y"], token)?) * scale;

        let id = self
            .map
            .add_station(Station::new(code, &name, kind, offset, relative_to));
        self.last_station = Some(id);
        Ok(())
    }

    fn platform(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let station = self.last_station.ok_or(ParseError::NoStation("platform"))?;
        let number = args.first().ok_or(ParseError::Missing("platform number"))?;
        let direction: Direction = args
            .get(1)
            .ok_or(ParseError::Missing("platform direction"))?
            .parse()?;
        let line = match args.get(2).and_then(|code| self.map.line_id(code)) {
            Some(line) => line,
            None => {
                let fallback = self
                    .map
                    .line_id(FALLBACK_LINE)
                    .ok_or_else(|| ParseError::UnknownLine(args.get(2).unwrap_or(&FALLBACK_LINE).to_string()))?;
                log::warn!(
                    "platform {number}: line {:?} not defined, using {FALLBACK_LINE:?}",
                    args.get(2).copied().unwrap_or("")
                );
                fallback
            }
        };
        let side = match args.get(3) {
            Some(code) => {
                PlatformSide::from_code(code).ok_or_else(|| ParseError::UnknownPlatformSide(code.to_string()))?
            }
            None => PlatformSide::BOTH,
        };

        let gap = self.config.station.station_gap;
        if let Some(station) = self.map.station_mut(station) {
            station.add_platform(number, direction, line, side, gap);
        }
        Ok(())
    }

    fn track(&mut self, args: &[&str], subtrack: bool) -> Result<(), ParseError> {
        let (from, leaves_start) = self.platform_ref(args.first().ok_or(ParseError::Missing("track source"))?)?;
        let (to, finishes_end) = self.platform_ref(args.get(1).ok_or(ParseError::Missing("track destination"))?)?;
        let line_code = args.get(2).ok_or(ParseError::Missing("track line"))?;
        let line = self
            .map
            .line_id(line_code)
            .ok_or_else(|| ParseError::UnknownLine(line_code.to_string()))?;
        self.map.add_track(Track {
            from,
            to,
            line,
            subtrack,
            leaves_start,
            finishes_end,
        });
        Ok(())
    }

    /// `<station>-<number>`, with a trailing `!` for the reversed end.
    fn platform_ref(&self, token: &str) -> Result<(PlatformId, bool), ParseError> {
        let caps = PLATFORM_REF_RE
            .captures(token)
            .ok_or_else(|| ParseError::BadPlatformRef(token.to_string()))?;
        let id = self.map.platform_id(&caps["station"], &caps["number"])?;
        Ok((id, caps.name("reverse").is_some()))
    }

    fn draw(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let station = self.last_station.ok_or(ParseError::NoStation("draw"))?;
        match *args.first().ok_or(ParseError::Missing("draw position"))? {
            "first" => self.draw_first.push(station),
            "last" => self.draw_last.push(station),
            other => return Err(ParseError::UnknownDrawPosition(other.to_string())),
        }
        Ok(())
    }

    fn label(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let station = self.last_station.ok_or(ParseError::NoStation("label"))?;
        let direction: Direction = args
            .first()
            .ok_or(ParseError::Missing("label direction"))?
            .parse()?;
        if let Some(station) = self.map.station_mut(station) {
            station.label_direction = Some(direction);
        }
        Ok(())
    }

    fn label_offset(&mut self, args: &[&str]) -> Result<(), ParseError> {
        let station = self.last_station.ok_or(ParseError::NoStation("label_offset"))?;
        let token = args.first().ok_or(ParseError::Missing("label offset"))?;
        let caps = LABEL_OFFSET_RE
            .captures(token)
            .ok_or_else(|| ParseError::BadCoordinates(token.to_string()))?;
        let offset = Vector2::new(number(&caps["x"], token)?, number(&caps["y"], token)?);
        if let Some(station) = self.map.station_mut(station) {
            station.label_offset = offset;
        }
        Ok(())
    }
}

fn number(text: &str, token: &str) -> Result<f64, ParseError> {
    text.parse()
        .map_err(|_| ParseError::BadCoordinates(token.to_string()))
}

// ── Writing offsets back ────────────────────────────────────────────

/// Rewrites every station line of `source` with the station's current own
/// offset, floored to half a map unit. Other lines are copied trimmed.
pub fn save_offsets(source: &str, map: &TubeMap, coordinate_scale: f64) -> String {
    let snap = |value: f64| (value / (coordinate_scale / 2.0)).floor() / 2.0;
    let mut out = String::with_capacity(source.len());
    for raw in source.lines() {
        let line = raw.trim();
        let mut parts = line.split_whitespace();
        let keyword = parts.next();
        let station = keyword
            .and_then(StationKind::from_keyword)
            .and(parts.next())
            .and_then(|code| map.station_by_code(code));
        let Some(station) = station else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let mut coords = format!("{:.1},{:.1}", snap(station.offset.x), snap(station.offset.y));
        if let Some(anchor) = station.relative_to.and_then(|id| map.station(id)) {
            coords = format!("{},{coords}", anchor.code);
        }
        let fields = [keyword.unwrap_or_default(), station.code.as_str(), station.name.as_str(), coords.as_str()];
        let rewritten: Vec<&str> = fields.into_iter().filter(|field| !field.is_empty()).collect();
        out.push_str(&rewritten.join(" "));
        out.push('\n');
    }
    out
}

/// Writes [`save_offsets`] output to `<path>.new`, then renames it over
/// `path`.
pub fn write_offsets(path: &Path, map: &TubeMap, coordinate_scale: f64) -> anyhow::Result<()> {
    let source = fs::read_to_string(path).with_context(|| format!("reading map {}", path.display()))?;
    let mut staged = path.as_os_str().to_owned();
    staged.push(".new");
    let staged = std::path::PathBuf::from(staged);
    fs::write(&staged, save_offsets(&source, map, coordinate_scale))
        .with_context(|| format!("writing {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("replacing {}", path.display()))?;
    log::debug!("wrote station offsets to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::PlatformStyle;

    const SAMPLE: &str = "\
# Two stations on one line
line central e32017
line error ff00ff
line none 000000

station BNK Bank 10,5
platform 1 E central
platform 2 W central L
label N
label_offset 2,-3

station LST Liverpool\\nStreet BNK,12.5,0
platform 1 E central R
draw first

depot WRD Ruislip Depot -4,5
platform 1 S

track BNK-1 LST-1 central
subtrack LST-1! BNK-2! central
";

    fn parse(input: &str) -> Result<TubeMap, LoadError> {
        parse_map(input, &Config::default())
    }

    #[test]
    fn parses_lines_stations_and_tracks() {
        let map = parse(SAMPLE).unwrap();
        assert_eq!(map.lines().len(), 3);
        assert_eq!(map.lines()[0].colors, vec![Color::from_hex("e32017").unwrap()]);

        let bank = map.station_by_code("BNK").unwrap();
        assert_eq!(bank.name, "Bank");
        assert_eq!(bank.offset, Vector2::new(100.0, 50.0));
        assert_eq!(bank.platforms.len(), 2);
        assert_eq!(bank.platforms[1].side, PlatformSide::LEFT);
        assert_eq!(bank.label_direction, Some(Direction::N));
        assert_eq!(bank.label_offset, Vector2::new(2.0, -3.0));

        let lst = map.station_id("LST").unwrap();
        assert_eq!(map.station(lst).unwrap().name, "Liverpool\\nStreet");
        assert_eq!(map.station_offset(lst), Vector2::new(225.0, 50.0));

        let depot = map.station_by_code("WRD").unwrap();
        assert_eq!(depot.kind, StationKind::Depot);
        assert_eq!(depot.name, "Ruislip Depot");
        assert_eq!(depot.platforms[0].style, PlatformStyle::Depot);
        assert_eq!(depot.platforms[0].line, map.line_id("error").unwrap());

        assert_eq!(map.tracks().len(), 2);
        let sub = &map.tracks()[1];
        assert!(sub.subtrack && sub.leaves_start && sub.finishes_end);
        assert_eq!(map.platform_label(sub.to), "BNK-2");
    }

    #[test]
    fn draw_clauses_reorder_after_loading() {
        let map = parse(SAMPLE).unwrap();
        let order: Vec<&str> = map
            .draw_order()
            .iter()
            .map(|&id| map.station(id).unwrap().code.as_str())
            .collect();
        assert_eq!(order, vec!["LST", "BNK", "WRD"]);
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("line a ffffff\n\nmonorail X 1,1\n").unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.source, ParseError::UnknownDirective("monorail".to_string()));
        assert_eq!(err.to_string(), "line 3: unknown directive \"monorail\"");

        let cases = [
            ("platform 1 E", ParseError::NoStation("platform")),
            ("station A Alpha", ParseError::Missing("station coordinates")),
            ("station A Alpha 1,x", ParseError::BadCoordinates("1,x".to_string())),
            ("station A B,1,1", ParseError::UnknownStation("B".to_string())),
            ("line a zzzzzz", ParseError::BadColor("zzzzzz".to_string())),
            ("station A 1,1\nplatform 1 Q", ParseError::UnknownDirection("Q".to_string())),
            ("station A 1,1\nplatform 1 E", ParseError::UnknownLine("error".to_string())),
            ("station A 1,1\ndraw middle", ParseError::UnknownDrawPosition("middle".to_string())),
            ("track A1 B-1 x", ParseError::BadPlatformRef("A1".to_string())),
        ];
        for (input, expected) in cases {
            assert_eq!(parse(input).unwrap_err().source, expected, "{input}");
        }
    }

    #[test]
    fn tracks_need_known_platforms_and_lines() {
        let base = "line l ffffff\nstation A 0,0\nplatform 1 E l\nstation B 5,0\nplatform 1 E l\n";
        assert_eq!(
            parse(&format!("{base}track A-1 B-2 l")).unwrap_err().source,
            ParseError::UnknownPlatform {
                station: "B".to_string(),
                platform: "2".to_string()
            }
        );
        assert_eq!(
            parse(&format!("{base}track A-1 B-1 bakerloo")).unwrap_err().source,
            ParseError::UnknownLine("bakerloo".to_string())
        );
        let side = parse("line l ffffff\nstation A 0,0\nplatform 1 E l X").unwrap_err();
        assert_eq!(side.source, ParseError::UnknownPlatformSide("X".to_string()));
    }

    #[test]
    fn save_offsets_snaps_moved_stations() {
        let mut map = parse(SAMPLE).unwrap();
        map.move_station("BNK", Vector2::new(7.0, -2.0)).unwrap();
        map.move_station("WRD", Vector2::new(-1.0, 0.0)).unwrap();
        let saved = save_offsets(SAMPLE, &map, 10.0);
        let lines: Vec<&str> = saved.lines().collect();
        assert_eq!(lines[0], "# Two stations on one line");
        assert!(lines.contains(&"station BNK Bank 10.5,4.5"));
        assert!(lines.contains(&"station LST Liverpool\\nStreet BNK,12.5,0.0"));
        assert!(lines.contains(&"depot WRD Ruislip Depot -4.5,5.0"));
        assert!(lines.contains(&"label_offset 2,-3"));
        assert_eq!(lines.len(), SAMPLE.lines().count());
    }
}
