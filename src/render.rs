//! HTML fragments returned by `/search`. Every fragment is wrapped in a
//! `<center>` block; interpolated text is always escaped.

use crate::gif::GifResult;
use crate::utils::escape_html;

const MISSING_INPUT_GIF: &str = "https://media3.giphy.com/media/FvLq3vP4eOjxhdTmTA/giphy.gif?cid=790b7611e1853785f307613923807b9d33200fc39426104a&rid=giphy.gif&ct=g";
const NO_SUCH_DAY_GIF: &str = "https://media3.giphy.com/media/wRwPiWQFz8dEV58TEI/giphy.gif?cid=790b7611a25f930a046f4e0a1a7ac23c57afc620fdc1edf3&rid=giphy.gif&ct=g";

pub const NOT_FOUND_PAGE: &str = "<h1>404 Not Found</h1>";

fn centered(body: &str) -> String {
    format!("<center>{}</center>", body)
}

fn image(url: &str, width: Option<u32>, height: Option<u32>) -> String {
    let mut tag = format!("<img src=\"{}\"", escape_html(url));
    if let Some(width) = width {
        tag.push_str(&format!(" width=\"{}\"", width));
    }
    if let Some(height) = height {
        tag.push_str(&format!(" height=\"{}\"", height));
    }
    tag.push('>');
    tag
}

pub fn missing_input() -> String {
    centered(&format!("<h1>Missing input</h1>{}", image(MISSING_INPUT_GIF, None, None)))
}

pub fn no_such_day(literal: &str) -> String {
    centered(&format!(
        "<h1>{}th Day of The Week Does Not Exist!</h1>{}",
        escape_html(literal),
        image(NO_SUCH_DAY_GIF, None, None)
    ))
}

pub fn holiday(name: &str, gif: Option<&GifResult>) -> String {
    let name = escape_html(name);
    match gif {
        Some(gif) => centered(&format!(
            "<h1>{}</h1>{}",
            name,
            image(&gif.url, Some(gif.width), Some(gif.height))
        )),
        None => centered(&format!("<h1>No {} Found!</h1>", name)),
    }
}

pub fn no_holiday(weekday: u8) -> String {
    centered(&format!(
        "<h1>No Public Holiday Falls On Day {} This Year</h1>",
        weekday
    ))
}

pub fn upstream_unavailable(provider: &str) -> String {
    centered(&format!(
        "<h1>Upstream Service Unavailable</h1><p>Could not get a usable answer from {}. Please try again later.</p>",
        escape_html(provider)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_holiday_with_gif() {
        let gif = GifResult {
            url: "https://media.giphy.com/media/abc/giphy.gif".to_string(),
            width: 480,
            height: 270,
        };
        let html = holiday("Independence Day", Some(&gif));
        assert_eq!(
            html,
            "<center><h1>Independence Day</h1><img src=\"https://media.giphy.com/media/abc/giphy.gif\" width=\"480\" height=\"270\"></center>"
        );
    }

    #[test]
    fn test_holiday_without_gif() {
        assert_eq!(
            holiday("Shab e-Barat", None),
            "<center><h1>No Shab e-Barat Found!</h1></center>"
        );
    }

    #[test]
    fn test_no_such_day_escapes_literal() {
        let html = no_such_day("<b>9</b>");
        assert!(html.contains("<h1>&lt;b&gt;9&lt;/b&gt;th Day of The Week Does Not Exist!</h1>"));
        assert!(html.starts_with("<center>") && html.ends_with("</center>"));
    }

    #[test]
    fn test_missing_input() {
        let html = missing_input();
        assert!(html.contains("<h1>Missing input</h1>"));
        assert!(html.contains("<img src=\"https://media3.giphy.com/media/FvLq3vP4eOjxhdTmTA/"));
    }

    #[test]
    fn test_no_holiday() {
        assert!(no_holiday(2).contains("Day 2"));
    }
}
