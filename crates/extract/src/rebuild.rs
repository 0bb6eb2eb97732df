//! Standalone document assembly from kept regions

use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::regions::Region;

/// One container written into the rebuilt document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContainerStatus {
    /// 1-based position of the container in the body
    pub index: usize,
    pub heading: String,
    /// Length in bytes of the wrapped markup
    pub markup_len: usize,
}

/// Wrap each region in `<div class="{container_class}">` and assemble a
/// minimal HTML page around them.
#[must_use]
pub fn render_document(regions: &[Region], container_class: &str) -> String {
    let mut containers = String::new();
    for region in regions {
        containers.push_str("<div class=\"");
        containers.push_str(container_class);
        containers.push_str("\">");
        containers.push_str(&region.markup);
        containers.push_str("</div>\n");
    }

    format!(
        r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Document</title>
</head>
<body>
    {containers}
</body>
</html>
"#
    )
}

/// Write the rebuilt document to `path`, creating or overwriting it.
pub fn write_document(
    path: &Path,
    regions: &[Region],
    container_class: &str,
) -> std::io::Result<Vec<ContainerStatus>> {
    std::fs::write(path, render_document(regions, container_class))?;
    info!(
        "Wrote rebuilt document with {} container(s) to {}",
        regions.len(),
        path.display()
    );

    Ok(regions
        .iter()
        .enumerate()
        .map(|(i, region)| ContainerStatus {
            index: i + 1,
            heading: region.heading.clone(),
            markup_len: region.markup.len(),
        })
        .collect())
}
