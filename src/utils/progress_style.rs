use indicatif::ProgressStyle;

const ONLY_MESSAGE_TEMPLATE: &str = "{spinner} {wide_msg}";
const NUMBER_TEMPLATE: &str = "{spinner} {msg:20} {wide_bar:} {pos:>4}/{len}";

pub struct ProgressStyleTemplate;

impl ProgressStyleTemplate {
    pub fn only_message() -> ProgressStyle {
        ProgressStyle::with_template(ONLY_MESSAGE_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    pub fn number_bar() -> ProgressStyle {
        ProgressStyle::with_template(NUMBER_TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
    }
}
