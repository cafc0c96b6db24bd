/// Runtime limits shared by all tools, constructed once at process start.
#[derive(Debug, Clone)]
pub struct ToolkitConfig {
    /// Hard cap applied to list pagination regardless of the requested limit.
    pub max_page_size: usize,
    /// Page size used when the caller does not pass a limit.
    pub default_page_size: usize,
}

impl Default for ToolkitConfig {
    fn default() -> Self {
        ToolkitConfig {
            max_page_size: 500,
            default_page_size: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ToolkitConfig::default();
        assert_eq!(config.max_page_size, 500);
        assert_eq!(config.default_page_size, 50);
    }
}
