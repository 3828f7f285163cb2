use crate::core::display::ad_rotation::AdAsset;

pub fn make_ad(id: &str, mimetype: &str) -> AdAsset {
    AdAsset {
        id: id.to_string(),
        filename: format!("ad-{id}"),
        mimetype: mimetype.to_string(),
        filepath: format!("/uploads/ad-{id}"),
    }
}

/// Two images, one video and one unsupported document.
pub fn make_ads() -> Vec<AdAsset> {
    let mut video = make_ad("2", "video/mp4");
    video.filename = "ad-2.mp4".to_string();
    video.filepath = "/uploads/ad-2.mp4".to_string();
    vec![
        make_ad("1", "image/png"),
        video,
        make_ad("3", "image/jpeg"),
        make_ad("4", "application/pdf"),
    ]
}
