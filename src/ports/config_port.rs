//! Configuration access port trait.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> i64;
    fn get_double(&self, section: &str, key: &str, default: f64) -> f64;
    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool;

    /// Comma-separated values, trimmed, blanks dropped. `default` when the
    /// key is absent or empty.
    fn get_list(&self, section: &str, key: &str, default: &[&str]) -> Vec<String> {
        let items: Vec<String> = self
            .get_string(section, key)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if items.is_empty() {
            default.iter().map(|s| s.to_string()).collect()
        } else {
            items
        }
    }
}
