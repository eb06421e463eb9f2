use crate::record::{BuiltinIcon, IconRef, PluginRecord};

/// Suggestions shown while the search text is empty, in display order.
pub fn default_links() -> Vec<PluginRecord> {
    vec![
        PluginRecord::link(
            "Go to Plugins Directory",
            "Looking for plugins for the WordPress?",
            "https://wordpress.org/plugins/",
            IconRef::Builtin(BuiltinIcon::Hammer),
        ),
        PluginRecord::link(
            "Go to Themes Directory",
            "Looking for themes for the WordPress?",
            "https://wordpress.org/themes/",
            IconRef::Builtin(BuiltinIcon::Brush),
        ),
        PluginRecord::link(
            "Go to Patterns Directory",
            "Looking for patterns for the WordPress?",
            "https://wordpress.org/patterns/",
            IconRef::Builtin(BuiltinIcon::PlusTopRightSquare),
        ),
    ]
}
