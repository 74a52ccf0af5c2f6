/*
 * This file is part of Allyfan.
 *
 * Copyright (C) 2025 Allyfan contributors
 *
 * Allyfan is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * Allyfan is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with Allyfan. If not, see <https://www.gnu.org/licenses/>.
 */

//! Sensor discovery on hwmon-style sysfs trees.
//!
//! Every function takes the monitoring root explicitly so tests can point
//! it at a fixture directory instead of `/sys/class/hwmon`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HwmonError {
    #[error("IO error: {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Decode bytes as UTF-8, dropping any invalid sequences.
fn decode_ignoring_invalid(mut bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                out.push_str(s);
                return out;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // valid_up_to guarantees this prefix decodes
                out.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(n) => bytes = &rest[n..],
                    None => return out,
                }
            }
        }
    }
}

pub fn read_trimmed<P: AsRef<Path>>(p: P) -> io::Result<String> {
    let raw = fs::read(p)?;
    Ok(decode_ignoring_invalid(&raw).trim().to_string())
}

pub fn read_int<P: AsRef<Path>>(p: P) -> Result<i64, HwmonError> {
    let p = p.as_ref();
    let raw = read_trimmed(p).map_err(|source| HwmonError::Io { path: p.to_path_buf(), source })?;
    raw.parse::<i64>()
        .map_err(|e| HwmonError::Parse(format!("{}: {:?}: {}", p.display(), raw, e)))
}

/// Convert a raw hwmon temperature to degrees Celsius.
///
/// hwmon reports millidegrees, but some drivers report whole degrees, so the
/// unit is picked per reading: values of 1000 and above are millidegrees.
pub fn temp_celsius(raw: i64) -> f64 {
    if raw >= 1000 {
        raw as f64 / 1000.0
    } else {
        raw as f64
    }
}

pub fn read_temp_c<P: AsRef<Path>>(p: P) -> Result<f64, HwmonError> {
    read_int(p).map(temp_celsius)
}

/// Find the first `hwmon*` directory under `root` whose `name` file equals
/// `target`.
///
/// Entries that cannot be read are skipped. When several devices share a
/// name, which one wins depends on directory enumeration order.
pub fn find_device_by_name(root: &Path, target: &str) -> Option<PathBuf> {
    let entries = fs::read_dir(root).ok()?;
    for ent in entries.flatten() {
        let fname = ent.file_name();
        if !fname.to_string_lossy().starts_with("hwmon") {
            continue;
        }
        let dir = ent.path();
        match read_trimmed(dir.join("name")) {
            Ok(name) if name == target => return Some(dir),
            _ => continue,
        }
    }
    None
}

/// Resolve a temperature input file for the device named `hw_name`.
///
/// `temp1_input` is preferred; otherwise the lexicographically first
/// `temp*_input` in the device directory.
pub fn find_temp_input(root: &Path, hw_name: &str) -> Option<PathBuf> {
    let dir = find_device_by_name(root, hw_name)?;

    let preferred = dir.join("temp1_input");
    if preferred.exists() {
        return Some(preferred);
    }

    let mut candidates: Vec<String> = fs::read_dir(&dir)
        .ok()?
        .flatten()
        .map(|ent| ent.file_name().to_string_lossy().into_owned())
        .filter(|fname| is_temp_input(fname))
        .collect();
    candidates.sort();
    candidates.into_iter().next().map(|fname| dir.join(fname))
}

fn is_temp_input(fname: &str) -> bool {
    fname.len() >= "temp_input".len() && fname.starts_with("temp") && fname.ends_with("_input")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::{add_chip, write_attr};
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_temp_celsius_millidegrees() {
        assert_eq!(temp_celsius(45000), 45.0);
        assert_eq!(temp_celsius(1000), 1.0);
        assert_eq!(temp_celsius(52125), 52.125);
    }

    #[test]
    fn test_temp_celsius_whole_degrees() {
        assert_eq!(temp_celsius(45), 45.0);
        assert_eq!(temp_celsius(999), 999.0);
        assert_eq!(temp_celsius(0), 0.0);
        assert_eq!(temp_celsius(-5), -5.0);
    }

    #[test]
    fn test_read_trimmed_strips_whitespace() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("name");
        let mut file = fs::File::create(&test_file).unwrap();
        writeln!(file, "  k10temp  ").unwrap();

        assert_eq!(read_trimmed(&test_file).unwrap(), "k10temp");
    }

    #[test]
    fn test_read_trimmed_drops_invalid_utf8() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("name");
        fs::write(&test_file, b"as\xffus\n").unwrap();

        assert_eq!(read_trimmed(&test_file).unwrap(), "asus");
    }

    #[test]
    fn test_read_trimmed_nonexistent_file() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_trimmed(temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_read_int_errors() {
        let temp_dir = TempDir::new().unwrap();
        let bad = temp_dir.path().join("bad");
        fs::write(&bad, "fast\n").unwrap();

        assert!(matches!(read_int(&bad), Err(HwmonError::Parse(_))));
        let missing = temp_dir.path().join("missing");
        match read_int(&missing) {
            Err(HwmonError::Io { ref path, .. }) => assert_eq!(path, &missing),
            other => panic!("Expected Io, got {:?}", other),
        }
    }

    #[test]
    fn test_find_device_by_name() {
        let root = TempDir::new().unwrap();
        add_chip(root.path(), "hwmon0", "acpitz");
        let asus = add_chip(root.path(), "hwmon3", "asus");

        assert_eq!(find_device_by_name(root.path(), "asus"), Some(asus));
        assert_eq!(find_device_by_name(root.path(), "amdgpu"), None);
    }

    #[test]
    fn test_find_device_by_name_exact_match_only() {
        let root = TempDir::new().unwrap();
        add_chip(root.path(), "hwmon0", "asus_custom_fan_curve");

        assert_eq!(find_device_by_name(root.path(), "asus"), None);
    }

    #[test]
    fn test_find_device_skips_unreadable_entries() {
        let root = TempDir::new().unwrap();
        // no name file
        fs::create_dir(root.path().join("hwmon0")).unwrap();
        // not a hwmon entry at all
        let other = root.path().join("thermal0");
        fs::create_dir(&other).unwrap();
        write_attr(&other, "name", "asus");
        let asus = add_chip(root.path(), "hwmon1", "asus");

        assert_eq!(find_device_by_name(root.path(), "asus"), Some(asus));
    }

    #[test]
    fn test_find_device_missing_root() {
        let root = TempDir::new().unwrap();
        assert_eq!(find_device_by_name(&root.path().join("nope"), "asus"), None);
    }

    #[test]
    fn test_find_temp_input_prefers_temp1() {
        let root = TempDir::new().unwrap();
        let dir = add_chip(root.path(), "hwmon2", "k10temp");
        write_attr(&dir, "temp1_input", "51000");
        write_attr(&dir, "temp3_input", "40000");

        assert_eq!(find_temp_input(root.path(), "k10temp"), Some(dir.join("temp1_input")));
    }

    #[test]
    fn test_find_temp_input_falls_back_to_first_sorted() {
        let root = TempDir::new().unwrap();
        let dir = add_chip(root.path(), "hwmon2", "amdgpu");
        write_attr(&dir, "temp3_input", "40000");
        write_attr(&dir, "temp2_input", "41000");
        write_attr(&dir, "temp2_label", "junction");

        assert_eq!(find_temp_input(root.path(), "amdgpu"), Some(dir.join("temp2_input")));
    }

    #[test]
    fn test_find_temp_input_none_without_inputs() {
        let root = TempDir::new().unwrap();
        let dir = add_chip(root.path(), "hwmon2", "amdgpu");
        write_attr(&dir, "fan1_input", "0");

        assert_eq!(find_temp_input(root.path(), "amdgpu"), None);
        assert_eq!(find_temp_input(root.path(), "k10temp"), None);
    }

    #[test]
    fn test_hwmon_error_display() {
        let err = HwmonError::InvalidData("Chip asus not found".into());
        assert_eq!(format!("{}", err), "Invalid data: Chip asus not found");
        let io_err = HwmonError::Io {
            path: PathBuf::from("/sys/class/hwmon/hwmon4/pwm1_enable"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(io_err.to_string(), "IO error: /sys/class/hwmon/hwmon4/pwm1_enable: denied");
    }
}
