use super::*;
use crate::{
    assets::decode::{ImageResource, decode_background},
    composition::{layout::LayoutConfig, request::CertificateRequest},
    foundation::core::Canvas,
};

fn solid_background(w: u32, h: u32, rgba: [u8; 4]) -> EncodedImage {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    ImageResource::from_bytes(buf).read_encoded().unwrap()
}

#[test]
fn markup_places_text_by_percentage_and_escapes_it() {
    let req = CertificateRequest::new("Tom & Jerry", "<Malang>").unwrap();
    let spec = RenderSpec::derive(&req, &LayoutConfig::default());
    let svg = preview_svg(&spec, &solid_background(4, 4, [0, 0, 0, 255]));

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains(r#"width="1200" height="800""#));
    assert!(svg.contains("data:image/png;base64,"));
    assert!(svg.contains(r#"x="50.000%" y="53.000%""#));
    assert!(svg.contains(r#"x="50.000%" y="60.000%""#));
    assert!(svg.contains(">TOM &amp; JERRY</text>"));
    assert!(svg.contains(">&lt;Malang&gt;</text>"));
    assert!(svg.contains(r#"paint-order="stroke""#));
}

#[test]
fn markup_is_valid_svg() {
    let req = CertificateRequest::new("Vespa Club X", "Malang").unwrap();
    let spec = RenderSpec::derive(&req, &LayoutConfig::default());
    let svg = preview_svg(&spec, &solid_background(4, 4, [0, 0, 0, 255]));
    let tree = usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
    assert_eq!(tree.size().width(), 1200.0);
    assert_eq!(tree.size().height(), 800.0);
}

#[test]
fn snapshot_has_fixed_dimensions_and_background() {
    let layout = LayoutConfig {
        canvas: Canvas::new(120, 80).unwrap(),
        ..LayoutConfig::default()
    };
    let spec = RenderSpec::derive(&CertificateRequest::new("", "").unwrap(), &layout);
    let renderer = SvgSnapshotRenderer::new(Arc::new(usvg::fontdb::Database::new()));
    let surface = renderer
        .render(
            &spec,
            &decode_background(solid_background(30, 20, [0, 128, 0, 255])).unwrap(),
        )
        .unwrap();

    assert_eq!(surface.strategy, RenderStrategy::SvgSnapshot);
    assert_eq!(surface.canvas, layout.canvas);
    assert_eq!(surface.rgba8_premul.len(), 120 * 80 * 4);
    let center = &surface.rgba8_premul[((40 * 120 + 60) * 4) as usize..][..4];
    assert!(center[1] > 100 && center[0] < 30, "center {center:?}");
}

#[test]
fn control_characters_are_dropped_from_markup() {
    let req = CertificateRequest::new("Ada\u{1}\u{8}Lovelace", "Line\u{b}Two\tTab").unwrap();
    let spec = RenderSpec::derive(&req, &LayoutConfig::default());
    let svg = preview_svg(&spec, &solid_background(4, 4, [0, 0, 0, 255]));

    assert!(svg.contains(">ADALOVELACE</text>"));
    assert!(svg.contains(">LineTwo\tTab</text>"));
    assert!(!svg.chars().any(|c| c < ' ' && !matches!(c, '\t' | '\n' | '\r')));
    usvg::Tree::from_str(&svg, &usvg::Options::default()).unwrap();
}
