mod args;
mod line;
mod markup;
mod tag;

pub use args::{
    build_command_line, parse_find_and_save, parse_pair, parse_save_to_variable, unquote,
    FindAndSaveArgs, SaveTarget, SaveValue,
};
pub use line::{script_lines, split_line, ScriptLine};
pub use markup::{extract_element_id, scan_start_tags, StartTag};
pub use tag::normalize_tag_name;
