use crate::{domain::summary::SummaryBlock, usecases::summarize::SummaryView};

pub fn render_summary(view: &SummaryView) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(notice) = view.notice.as_deref() {
        lines.push(format!("! {notice}"));
    }

    for block in &view.blocks {
        match block {
            SummaryBlock::Heading(text) => {
                if !lines.is_empty() {
                    lines.push(String::new());
                }
                lines.push(text.to_uppercase());
            }
            SummaryBlock::Bullet(text) | SummaryBlock::Numbered(text) => {
                lines.push(format!("  {text}"));
            }
            SummaryBlock::Paragraph(text) => lines.push(text.clone()),
        }
    }

    lines
}
