pub mod formatter;

pub use formatter::{
    format_final_result, format_grade_report, format_projection, format_saved_detail,
    format_saved_list, should_use_colors,
};
