use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::Photo;

const TAG_LIMIT: usize = 6;

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "—"
    } else {
        s
    }
}

/// Shortens a tag list for the grid; the detail view shows all of them.
pub fn format_tags(photo: &Photo) -> String {
    let tags = photo.tag_list();
    if tags.is_empty() {
        return "—".to_string();
    }
    if tags.len() <= TAG_LIMIT {
        return tags.join(" ");
    }
    format!("{} (+{})", tags[..TAG_LIMIT].join(" "), tags.len() - TAG_LIMIT)
}

pub fn render(photos: &[Photo]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["#", "Title", "Author", "Tags", "Thumbnail"]);

    for (i, photo) in photos.iter().enumerate() {
        let index = (i + 1).to_string();
        let tags = format_tags(photo);
        table.add_row(vec![
            index.as_str(),
            or_dash(&photo.title),
            or_dash(&photo.author),
            tags.as_str(),
            photo.image.as_str(),
        ]);
    }

    table.to_string()
}

pub fn compact_line(index: usize, photo: &Photo) -> String {
    format!(
        "{index} | {} | {} | {}",
        or_dash(&photo.title),
        or_dash(&photo.author_id),
        photo.link
    )
}

/// Full view of a single photo: title, author, every tag and both image URLs.
pub fn render_detail(photo: &Photo) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let tags = photo.tag_list().join(", ");
    table.add_row(vec!["Title", or_dash(&photo.title)]);
    table.add_row(vec!["Author", or_dash(&photo.author)]);
    table.add_row(vec!["Author ID", or_dash(&photo.author_id)]);
    table.add_row(vec!["Tags", or_dash(&tags)]);
    table.add_row(vec!["Image", photo.link.as_str()]);
    table.add_row(vec!["Thumbnail", photo.image.as_str()]);

    table.to_string()
}
