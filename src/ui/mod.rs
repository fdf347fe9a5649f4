//! 控制台层：输入（console）与输出渲染（render），crossterm 负责清屏

pub mod console;
pub mod render;

pub use console::{clear_screen, print_banner, prompt_request, read_description, read_instructions};
pub use render::{clean_markdown, render_cleanup, render_outcome, render_saved};
