//! 从播放器传来的文件名推断搜索标题
//!
//! 例：`Titanic.1997.1080p.BluRay.x264-GROUP.mkv` -> `Titanic` (1997)

use regex::Regex;

use crate::models::ResolvedTitle;

const VIDEO_EXTENSIONS: &[&str] = &[
    "mkv", "mp4", "avi", "m4v", "mov", "wmv", "ts", "m2ts", "webm", "mpg", "mpeg", "flv",
];

lazy_static::lazy_static! {
    static ref BRACKETED: Regex = Regex::new(r"\[[^\]]*\]|\{[^}]*\}").unwrap();
    static ref YEAR_TOKEN: Regex = Regex::new(r"^\(?((?:19|20)\d{2})\)?$").unwrap();
    /// 分辨率 / HDR / 片源 / 编码 / 剧集标记，遇到即截断
    ///
    /// `web`、`cam`、`extended` 这类同时也是普通单词的标记不在此列；
    /// 它们总是出现在年份或分辨率之后，而标题在那里已经截断。
    static ref RELEASE_TOKEN: Regex = Regex::new(
        r"(?ix)^(
            \d{3,4}[pi] | 4k | uhd |
            hdr\d*\+? | dovi | sdr |
            blu-?ray | brrip | bdrip | bdremux | remux | web-?dl | webrip | hdtv | hdrip | dvdrip | dvdscr |
            x26[45] | h26[45] | hevc | avc | xvid | 10bit |
            aac\d* | ac3 | dts | ddp?\d* | atmos |
            s\d{1,2}(e\d{1,3})?
        )(-.*)?$"
    ).unwrap();
}

/// 从 extra 路由段（`filename=...&videoSize=...`）中取出文件名
pub fn filename_from_extra(extra: &str) -> Option<String> {
    let extra = extra.strip_suffix(".json").unwrap_or(extra);
    url::form_urlencoded::parse(extra.as_bytes())
        .find(|(key, _)| key == "filename")
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// 清理文件名得到标题与年份
pub fn title_from_filename(filename: &str) -> Option<ResolvedTitle> {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename);

    let stem = match base.rsplit_once('.') {
        Some((stem, ext)) if VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) => stem,
        _ => base,
    };

    let cleaned = BRACKETED.replace_all(stem, " ").replace(['.', '_'], " ");

    let mut title_tokens: Vec<&str> = Vec::new();
    let mut year = None;
    for token in cleaned.split_whitespace() {
        if !title_tokens.is_empty() {
            if let Some(cap) = YEAR_TOKEN.captures(token) {
                year = cap[1].parse::<i32>().ok();
                break;
            }
        }
        if RELEASE_TOKEN.is_match(token) {
            break;
        }
        if token == "-" {
            continue;
        }
        title_tokens.push(token);
    }

    let title = title_tokens.join(" ");
    let title = title.trim_matches(|c: char| c == '-' || c.is_whitespace());
    if title.is_empty() {
        None
    } else {
        Some(ResolvedTitle::new(title, year))
    }
}
