//! Line-oriented parser for db.txt.

use super::types::{
    Country, Database, Flags, FreqBand, Permission, PowerRestriction, DEFAULT_BANDWIDTH,
};
use crate::error::DbError;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::io::BufRead;
use std::mem;
use tracing::warn;

/// Non-fatal problem found while parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning (line {}): {}", self.line, self.message)
    }
}

/// Named band or power definitions.
///
/// A definition equal to an earlier one is recorded as an alias of it, so
/// rules referring to either name share one value.
#[derive(Debug)]
struct Definitions<T> {
    items: HashMap<String, T>,
    order: Vec<String>,
    by_value: HashMap<T, String>,
    alias_of: HashMap<String, String>,
    lines: HashMap<String, usize>,
    used: HashSet<String>,
}

impl<T> Default for Definitions<T> {
    fn default() -> Self {
        Self {
            items: HashMap::new(),
            order: Vec::new(),
            by_value: HashMap::new(),
            alias_of: HashMap::new(),
            lines: HashMap::new(),
            used: HashSet::new(),
        }
    }
}

impl<T: Clone + Eq + Hash> Definitions<T> {
    /// Record `item` under `name`, returning the name of an equal earlier
    /// definition if there is one.
    fn define(&mut self, name: &str, item: T, line: usize) -> Option<String> {
        let earlier = self.by_value.get(&item).cloned();
        let canonical = earlier.clone().unwrap_or_else(|| name.to_string());
        self.alias_of.insert(name.to_string(), canonical);
        if !self.items.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.items.insert(name.to_string(), item.clone());
        self.by_value.insert(item, name.to_string());
        self.lines.insert(name.to_string(), line);
        earlier
    }

    fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    /// Mark `name` as used and return the canonical name and value.
    fn resolve(&mut self, name: &str) -> Option<(String, T)> {
        self.used.insert(name.to_string());
        let canonical = self.alias_of.get(name)?.clone();
        let item = self.items.get(&canonical)?.clone();
        Some((canonical, item))
    }

    /// Unreferenced definitions that are not aliases, with their lines.
    fn unused(&self) -> Vec<(String, usize)> {
        self.order
            .iter()
            .filter(|name| !self.used.contains(*name))
            .filter(|name| self.alias_of.get(*name) == Some(*name))
            .map(|name| (name.clone(), self.lines.get(name).copied().unwrap_or(0)))
            .collect()
    }
}

/// Parser for the regulatory database text format.
///
/// ```text
/// band EU24: 2402 - 2482 @ 40
/// power STD: N/A, 20, N/A
///
/// country DE,AT:
///     EU24, STD
///     (5170 - 5250 @ 40), (N/A, 100mW, N/A), NO-OUTDOOR
/// ```
///
/// Whitespace is insignificant, `#` starts a comment and comment lines
/// directly above a definition are attached to it. Each call to
/// [`DbParser::parse`] starts from a clean state; warnings from the last
/// run stay available through [`DbParser::warnings`].
#[derive(Debug, Default)]
pub struct DbParser {
    line: usize,
    comments: Vec<String>,
    bands: Definitions<FreqBand>,
    power: Definitions<PowerRestriction>,
    countries: HashMap<String, Country>,
    country_order: Vec<String>,
    current_country: Option<String>,
    warnings: Vec<ParseWarning>,
}

impl DbParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Warnings emitted by the last parse.
    pub fn warnings(&self) -> &[ParseWarning] {
        &self.warnings
    }

    pub fn parse_str(&mut self, text: &str) -> Result<Database, DbError> {
        self.parse(text.as_bytes())
    }

    /// Parse a whole database.
    pub fn parse<R: BufRead>(&mut self, reader: R) -> Result<Database, DbError> {
        *self = Self::default();

        for raw in reader.lines() {
            let raw = raw?;
            self.line += 1;

            let trimmed = raw.trim();
            if let Some(comment) = trimmed.strip_prefix('#') {
                self.comments.push(comment.trim().to_string());
            }

            let compact: String = trimmed.chars().filter(|c| *c != ' ' && *c != '\t').collect();
            if compact.is_empty() {
                self.comments.clear();
            }
            let content = match compact.find('#') {
                Some(at) => &compact[..at],
                None => compact.as_str(),
            };
            if content.is_empty() {
                continue;
            }

            if let Some(rest) = content.strip_prefix("band") {
                self.parse_band(rest)?;
                self.current_country = None;
            } else if let Some(rest) = content.strip_prefix("power") {
                self.parse_power(rest)?;
                self.current_country = None;
            } else if let Some(rest) = content.strip_prefix("country") {
                self.parse_country(rest)?;
            } else if self.current_country.is_some() {
                self.parse_country_item(content)?;
            } else {
                return Err(self.syntax_error("Expected band, power or country definition"));
            }
            self.comments.clear();
        }

        self.warn_unused();
        Ok(self.collect_countries())
    }

    fn syntax_error(&self, message: impl Into<String>) -> DbError {
        DbError::Syntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn warn_at(&mut self, line: usize, message: String) {
        warn!(line, "{}", message);
        self.warnings.push(ParseWarning { line, message });
    }

    fn parse_band(&mut self, rest: &str) -> Result<(), DbError> {
        let (name, def) = rest
            .split_once(':')
            .ok_or_else(|| self.syntax_error("band name must be followed by colon"))?;
        if name.is_empty() {
            return Err(self.syntax_error("'band' keyword must be followed by name"));
        }
        if Flags::from_name(name).is_some() {
            return Err(self.syntax_error("Invalid band name"));
        }
        self.parse_band_def(name, def, true)
    }

    fn parse_band_def(
        &mut self,
        name: &str,
        def: &str,
        warn_duplicate: bool,
    ) -> Result<(), DbError> {
        let (freqs, max_bandwidth) = match def.split_once('@') {
            Some((freqs, bw)) => (freqs, bw.parse::<f64>().unwrap_or(DEFAULT_BANDWIDTH)),
            None => (def, DEFAULT_BANDWIDTH),
        };
        let (start, end) = freqs
            .split_once('-')
            .and_then(|(start, end)| Some((start.parse::<f64>().ok()?, end.parse::<f64>().ok()?)))
            .ok_or_else(|| self.syntax_error("band must have frequency range"))?;

        let band = FreqBand {
            start,
            end,
            max_bandwidth,
            comments: mem::take(&mut self.comments),
        };
        let line = self.line;
        if let Some(earlier) = self.bands.define(name, band, line) {
            if warn_duplicate {
                let message = format!("Duplicate band definition (\"{name}\" and \"{earlier}\")");
                self.warn_at(line, message);
            }
        }
        Ok(())
    }

    fn parse_power(&mut self, rest: &str) -> Result<(), DbError> {
        let (name, def) = rest
            .split_once(':')
            .ok_or_else(|| self.syntax_error("power name must be followed by colon"))?;
        if name.is_empty() {
            return Err(self.syntax_error("'power' keyword must be followed by name"));
        }
        if Flags::from_name(name).is_some() {
            return Err(self.syntax_error("Invalid power name"));
        }
        self.parse_power_def(name, def, true)
    }

    fn parse_power_def(
        &mut self,
        name: &str,
        def: &str,
        warn_duplicate: bool,
    ) -> Result<(), DbError> {
        let values: Vec<&str> = def.split(',').collect();
        let [gain, ir, eirp] = values.as_slice() else {
            return Err(self.syntax_error("invalid power data"));
        };
        let (max_ant_gain, max_ir, max_eirp) = match (
            parse_power_value(gain, false),
            parse_power_value(ir, true),
            parse_power_value(eirp, true),
        ) {
            (Some(gain), Some(ir), Some(eirp)) => (gain, ir, eirp),
            _ => return Err(self.syntax_error("invalid power data")),
        };

        let power = PowerRestriction {
            max_ant_gain,
            max_ir,
            max_eirp,
            comments: mem::take(&mut self.comments),
        };
        let line = self.line;
        if let Some(earlier) = self.power.define(name, power, line) {
            if warn_duplicate {
                let message = format!("Duplicate power definition (\"{name}\" and \"{earlier}\")");
                self.warn_at(line, message);
            }
        }
        Ok(())
    }

    fn parse_country(&mut self, rest: &str) -> Result<(), DbError> {
        let (name, extra) = rest
            .split_once(':')
            .ok_or_else(|| self.syntax_error("country name must be followed by colon"))?;
        if name.is_empty() {
            return Err(self.syntax_error("'country' keyword must be followed by name"));
        }
        if !extra.is_empty() {
            return Err(self.syntax_error("extra data at end of country line"));
        }

        if !self.countries.contains_key(name) {
            let country = Country::new(mem::take(&mut self.comments));
            self.countries.insert(name.to_string(), country);
            self.country_order.push(name.to_string());
        }
        self.current_country = Some(name.to_string());
        Ok(())
    }

    fn parse_country_item(&mut self, item: &str) -> Result<(), DbError> {
        let unnamed = format!("UNNAMED {}", self.line);

        let (band_name, rest) = if let Some(inner) = item.strip_prefix('(') {
            let (def, rest) = inner
                .split_once("),")
                .ok_or_else(|| self.syntax_error("Badly parenthesised band definition"))?;
            self.parse_band_def(&unnamed, def, false)
                .map_err(|_| self.syntax_error("Badly parenthesised band definition"))?;
            (unnamed.as_str(), rest)
        } else {
            let (name, rest) = item
                .split_once(',')
                .ok_or_else(|| self.syntax_error("country definition must have band and power"))?;
            if name.is_empty() {
                return Err(self.syntax_error("country definition must have band"));
            }
            (name, rest)
        };
        if rest.is_empty() {
            return Err(self.syntax_error("country definition must have power"));
        }

        let (power_name, flag_names): (&str, Vec<&str>) = if rest.starts_with('(') {
            let (def, flags) = match rest.split_once("),") {
                Some((def, flags)) => (def, flags.split(',').collect()),
                None => {
                    let def = rest
                        .strip_suffix(')')
                        .ok_or_else(|| self.syntax_error("Badly parenthesised power definition"))?;
                    (def, Vec::new())
                }
            };
            self.parse_power_def(&unnamed, &def[1..], false)?;
            (unnamed.as_str(), flags)
        } else {
            match rest.split_once(',') {
                Some((name, flags)) => (name, flags.split(',').collect()),
                None => (rest, Vec::new()),
            }
        };

        if !self.bands.contains(band_name) {
            return Err(self.syntax_error("band does not exist"));
        }
        if !self.power.contains(power_name) {
            return Err(self.syntax_error("power does not exist"));
        }
        let (band_name, band) = self
            .bands
            .resolve(band_name)
            .ok_or_else(|| self.syntax_error("band does not exist"))?;
        let (power_name, power) = self
            .power
            .resolve(power_name)
            .ok_or_else(|| self.syntax_error("power does not exist"))?;

        let permission =
            Permission::new(band, power, flag_names.as_slice()).map_err(|err| match err {
                DbError::Flag(flag) => self.syntax_error(format!("Invalid flag '{flag}'")),
                other => other,
            })?;

        let Some(country_name) = self.current_country.clone() else {
            return Err(self.syntax_error("Expected band, power or country definition"));
        };
        let Some(country) = self.countries.get_mut(&country_name) else {
            return Err(self.syntax_error("Expected band, power or country definition"));
        };
        if country.contains(&permission) {
            let line = self.line;
            self.warn_at(
                line,
                format!("Rule \"{band_name}, {power_name}\" added to \"{country_name}\" twice"),
            );
        } else {
            country.add(permission);
        }
        Ok(())
    }

    fn warn_unused(&mut self) {
        for (name, line) in self.bands.unused() {
            self.warn_at(line, format!("Unused band definition \"{name}\""));
        }
        for (name, line) in self.power.unused() {
            self.warn_at(line, format!("Unused power definition \"{name}\""));
        }
    }

    /// Expand comma-separated country names; later blocks win on overlap.
    fn collect_countries(&self) -> Database {
        let mut countries = BTreeMap::new();
        for key in &self.country_order {
            if let Some(country) = self.countries.get(key) {
                for code in key.split(',') {
                    countries.insert(code.to_string(), country.clone());
                }
            }
        }
        Database::new(countries)
    }
}

/// Parse a power figure. `N/A` means 0; with `allow_mw`, a `mW` suffix is
/// converted to dBm.
fn parse_power_value(text: &str, allow_mw: bool) -> Option<f64> {
    if text == "N/A" {
        return Some(0.0);
    }
    if allow_mw {
        if let Some(mw) = text.strip_suffix("mW") {
            let mw: f64 = mw.parse().ok()?;
            if mw <= 0.0 {
                return None;
            }
            return Some(10.0 * mw.log10());
        }
    }
    text.parse().ok()
}
