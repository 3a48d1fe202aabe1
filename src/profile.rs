//! Name-keyed user profiles with flat-file persistence.
//!
//! The store loads once at startup and is rewritten wholesale at shutdown.
//! Record format is one profile per line:
//! `name,weight,bath_temperature,shower_temperature`. Malformed lines are
//! skipped with a warning rather than failing the load.

use crate::error::{ControlError, ControlResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub weight_kg: f64,
    pub bath_temperature_c: f64,
    pub shower_temperature_c: f64,
}

/// Profile map plus the active selection.
///
/// The active profile is held by name and resolved through the map on each
/// access, so removing the referenced profile can never leave a dangling
/// reference: removal clears the selection.
#[derive(Debug, Default)]
pub struct ProfileStore {
    profiles: HashMap<String, UserProfile>,
    active_name: Option<String>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: &str, profile: UserProfile) -> ControlResult<()> {
        if self.profiles.contains_key(name) {
            return Err(ControlError::ProfileExists { name: name.into() });
        }
        self.profiles.insert(name.to_string(), profile);
        Ok(())
    }

    pub fn edit(&mut self, name: &str, profile: UserProfile) -> ControlResult<()> {
        match self.profiles.get_mut(name) {
            Some(slot) => {
                *slot = profile;
                Ok(())
            }
            None => Err(ControlError::ProfileNotFound { name: name.into() }),
        }
    }

    pub fn remove(&mut self, name: &str) -> ControlResult<UserProfile> {
        let removed = self
            .profiles
            .remove(name)
            .ok_or_else(|| ControlError::ProfileNotFound { name: name.into() })?;
        if self.active_name.as_deref() == Some(name) {
            self.active_name = None;
        }
        Ok(removed)
    }

    pub fn get(&self, name: &str) -> ControlResult<UserProfile> {
        self.profiles
            .get(name)
            .copied()
            .ok_or_else(|| ControlError::ProfileNotFound { name: name.into() })
    }

    pub fn set_active(&mut self, name: &str) -> ControlResult<()> {
        if !self.profiles.contains_key(name) {
            return Err(ControlError::ProfileNotFound { name: name.into() });
        }
        self.active_name = Some(name.to_string());
        Ok(())
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active_name.as_deref()
    }

    pub fn get_active(&self) -> ControlResult<UserProfile> {
        let name = self
            .active_name
            .as_deref()
            .ok_or(ControlError::NoActiveProfile)?;
        self.get(name)
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Loads profiles from the flat file. A missing file is an empty store,
    /// not an error; malformed lines are skipped with a warning.
    pub fn load(path: &Path) -> io::Result<Self> {
        let mut store = Self::new();
        let file = match std::fs::File::open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(store),
            Err(e) => return Err(e),
        };

        for (lineno, line) in BufReader::new(file).lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match parse_record(&line) {
                Some((name, profile)) => {
                    // Last record wins on duplicate names.
                    store.profiles.insert(name, profile);
                }
                None => {
                    warn!(
                        "skipping malformed profile record at {}:{}",
                        path.display(),
                        lineno + 1
                    );
                }
            }
        }
        Ok(store)
    }

    /// Rewrites the whole store atomically: write a sibling temp file, then
    /// rename it over the target.
    pub fn dump(&self, path: &Path) -> io::Result<()> {
        let tmp = path.with_extension("tmp");
        {
            let mut file = std::fs::File::create(&tmp)?;
            let mut names: Vec<&String> = self.profiles.keys().collect();
            names.sort();
            for name in names {
                let p = &self.profiles[name];
                writeln!(
                    file,
                    "{},{},{},{}",
                    name, p.weight_kg, p.bath_temperature_c, p.shower_temperature_c
                )?;
            }
            file.sync_all()?;
        }
        std::fs::rename(&tmp, path)
    }
}

fn parse_record(line: &str) -> Option<(String, UserProfile)> {
    let mut fields = line.split(',');
    let name = fields.next()?.trim();
    if name.is_empty() {
        return None;
    }
    let weight_kg: f64 = fields.next()?.trim().parse().ok()?;
    let bath_temperature_c: f64 = fields.next()?.trim().parse().ok()?;
    let shower_temperature_c: f64 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some((
        name.to_string(),
        UserProfile {
            weight_kg,
            bath_temperature_c,
            shower_temperature_c,
        },
    ))
}
