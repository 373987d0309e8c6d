//! Formatting utilities

use gm_animation::Vec3;

/// Format a vector with three decimals per component
pub fn format_vec3(value: Vec3) -> String {
    format!("({:.3}, {:.3}, {:.3})", value.x, value.y, value.z)
}

/// Format a time in seconds
pub fn format_seconds(seconds: f32) -> String {
    format!("{seconds:.3}s")
}

/// Format a parent link, roots shown as "-"
pub fn format_parent(parent: i32) -> String {
    if parent < 0 {
        "-".to_string()
    } else {
        parent.to_string()
    }
}
