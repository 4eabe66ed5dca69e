//! Named path templates such as `/products/:id`.

use crate::error::ConfigError;

/// Fills every `:name` segment of `template` from `params`.
///
/// Segments that do not start with `:` are copied unchanged. Unused params
/// are ignored.
pub fn resolve<V: ToString>(template: &str, params: &[(&str, V)]) -> Result<String, ConfigError> {
    let segments = template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| value.to_string())
                .ok_or_else(|| ConfigError::MissingTemplateParam {
                    template: template.to_string(),
                    param: name.to_string(),
                }),
            None => Ok(segment.to_string()),
        })
        .collect::<Result<Vec<String>, ConfigError>>()?;
    Ok(segments.join("/"))
}

/// Names of the `:name` placeholders in `template`, in order.
pub fn placeholders(template: &str) -> Vec<&str> {
    template
        .split('/')
        .filter_map(|segment| segment.strip_prefix(':'))
        .collect()
}
