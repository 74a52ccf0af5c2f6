/*
 * Test utilities and fixture helpers for Allyfan
 *
 * This module provides builders for fake hwmon trees and configs that
 * point every path into a temporary directory.
 */

#[cfg(test)]
pub mod test_utils {
    use crate::config::PluginConfig;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Write one sysfs-style attribute file with a trailing newline.
    pub fn write_attr(dir: &Path, fname: &str, value: &str) {
        fs::write(dir.join(fname), format!("{}\n", value)).unwrap();
    }

    /// Create `root/<tag>` with a `name` file.
    pub fn add_chip(root: &Path, tag: &str, name: &str) -> PathBuf {
        let dir = root.join(tag);
        fs::create_dir_all(&dir).unwrap();
        write_attr(&dir, "name", name);
        dir
    }

    /// Write all eight auto points for one pwm channel.
    pub fn write_curve_points(curve: &Path, channel: u8, base_temp: i64, base_pwm: i64) {
        for i in 1..=8i64 {
            write_attr(curve, &format!("pwm{}_auto_point{}_temp", channel, i), &(base_temp + i * 10).to_string());
            write_attr(curve, &format!("pwm{}_auto_point{}_pwm", channel, i), &(base_pwm + i * 20).to_string());
        }
    }

    pub struct AllyTree {
        pub dir: TempDir,
        pub asus: PathBuf,
        pub curve: PathBuf,
        pub k10temp: PathBuf,
        pub amdgpu: PathBuf,
    }

    impl AllyTree {
        pub fn root(&self) -> PathBuf {
            self.dir.path().join("hwmon")
        }

        pub fn profile_path(&self) -> PathBuf {
            self.dir.path().join("ally-fan-profile.conf")
        }

        /// Config with every path inside the fixture and harmless commands.
        pub fn config(&self) -> PluginConfig {
            PluginConfig {
                hwmon_root: self.root(),
                profile_path: self.profile_path(),
                service_manager: "false".into(),
                fallback_helper: PathBuf::from("true"),
                ..PluginConfig::default()
            }
        }
    }

    /// Build a complete ROG Ally hwmon tree: fans, temps, enable flags and
    /// both curves.
    pub fn create_ally_tree() -> AllyTree {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("hwmon");
        let k10temp = add_chip(&root, "hwmon1", "k10temp");
        write_attr(&k10temp, "temp1_input", "61250");
        let amdgpu = add_chip(&root, "hwmon2", "amdgpu");
        write_attr(&amdgpu, "temp1_input", "54000");
        let asus = add_chip(&root, "hwmon5", "asus");
        write_attr(&asus, "fan1_input", "3100");
        write_attr(&asus, "fan2_input", "2900");
        let curve = add_chip(&root, "hwmon6", "asus_custom_fan_curve");
        write_attr(&curve, "pwm1_enable", "1");
        write_attr(&curve, "pwm2_enable", "2");
        write_curve_points(&curve, 1, 20, 0);
        write_curve_points(&curve, 2, 25, 5);

        AllyTree { dir, asus, curve, k10temp, amdgpu }
    }
}
