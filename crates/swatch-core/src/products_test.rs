use super::*;

fn urls(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

#[test]
fn carousel_first_image_moves_to_end() {
    let out = normalize_carousel_images(urls(&["//c/last.png", "//c/1.png", "//c/2.png"]));
    assert_eq!(out, urls(&["//c/1.png", "//c/2.png", "//c/last.png"]));
}

#[test]
fn carousel_duplicates_keep_first_occurrence() {
    let out = normalize_carousel_images(urls(&[
        "//c/z.png",
        "//c/a.png",
        "//c/b.png",
        "//c/a.png",
        "//c/z.png",
    ]));
    assert_eq!(out, urls(&["//c/a.png", "//c/b.png", "//c/z.png"]));
}

#[test]
fn carousel_blank_entries_are_dropped() {
    let out = normalize_carousel_images(urls(&["", "//c/a.png", "  ", "//c/b.png"]));
    assert_eq!(out, urls(&["//c/b.png", "//c/a.png"]));
}

#[test]
fn carousel_single_image_is_unchanged() {
    let out = normalize_carousel_images(urls(&["//c/a.png", "//c/a.png"]));
    assert_eq!(out, urls(&["//c/a.png"]));
}

#[test]
fn carousel_empty_stays_empty() {
    assert!(normalize_carousel_images(Vec::new()).is_empty());
}

#[test]
fn carousel_output_never_contains_duplicates() {
    let raw = urls(&["a", "b", "a", "c", "b", "d", "a"]);
    let out = normalize_carousel_images(raw);
    let unique: HashSet<&String> = out.iter().collect();
    assert_eq!(unique.len(), out.len());
    assert_eq!(out, urls(&["b", "c", "d", "a"]));
}

#[test]
fn dedupe_urls_keeps_order_without_rotation() {
    let out = dedupe_urls(urls(&[" //c/a.png", "//c/b.png", "//c/a.png", ""]));
    assert_eq!(out, urls(&["//c/a.png", "//c/b.png"]));
}

#[test]
fn variant_from_raw_normalizes_images() {
    let raw = RawVariant {
        images: urls(&["//c/3.png", "//c/1.png", "//c/2.png"]),
        color_name: "  Natural White ".to_string(),
        swatch: "rgb(240, 236, 227)".to_string(),
        color_type: "Limited".to_string(),
    };
    let variant = Variant::from(raw);
    assert_eq!(variant.color_name, "Natural White");
    assert_eq!(variant.color_type, "limited");
    assert_eq!(variant.images, urls(&["//c/1.png", "//c/2.png", "//c/3.png"]));
    assert!(variant.has_images());
}

#[test]
fn raw_variant_deserializes_with_missing_fields() {
    let raw: RawVariant =
        serde_json::from_value(serde_json::json!({ "colorName": "Jet Black" })).unwrap();
    assert_eq!(raw.color_name, "Jet Black");
    assert!(raw.images.is_empty());
    assert!(raw.swatch.is_empty());
    assert!(!Variant::from(raw).has_images());
}

#[test]
fn route_from_title_strips_apostrophes_and_hyphenates() {
    assert_eq!(route_from_title("Men's Tree Runners"), "mens-tree-runners");
    assert_eq!(route_from_title("  Women\u{2019}s  Wool Loungers "), "womens-wool-loungers");
}

#[test]
fn route_from_title_drops_characters_invalid_in_keys() {
    assert_eq!(route_from_title("Tree Runner 2.0 [Limited]"), "tree-runner-20-limited");
    assert_eq!(route_from_title("Sock #3 / Pair"), "sock-3-pair");
}

#[test]
fn route_from_url_uses_last_path_segment() {
    assert_eq!(
        route_from_url("https://shop.example.com/products/mens-tree-runners?size=9").as_deref(),
        Some("mens-tree-runners")
    );
    assert_eq!(
        route_from_url("https://shop.example.com/products/Wool-Runner/").as_deref(),
        Some("wool-runner")
    );
}

#[test]
fn route_from_url_without_path_is_none() {
    assert_eq!(route_from_url("https://shop.example.com"), None);
    assert_eq!(route_from_url("https://shop.example.com/"), None);
}

#[test]
fn swatch_label_yields_slug() {
    assert_eq!(
        parse_swatch_label("Select color Natural White (Cream Sole)").as_deref(),
        Some("natural-white")
    );
    assert_eq!(
        parse_swatch_label("color Jet Black (Black Sole)").as_deref(),
        Some("jet-black")
    );
}

#[test]
fn swatch_label_without_colour_pattern_is_none() {
    assert_eq!(parse_swatch_label("Add to cart"), None);
    assert_eq!(parse_swatch_label(""), None);
}

#[test]
fn swatch_labels_dedupe_in_order() {
    let slugs = parse_swatch_labels([
        "Select color Jet Black (Black Sole)",
        "Select color Natural White (Cream Sole)",
        "Select color Jet Black (Black Sole)",
        "unrelated",
        "Select color Stony Cream (Natural Sole)",
    ]);
    assert_eq!(slugs, urls(&["jet-black", "natural-white", "stony-cream"]));
}

#[test]
fn route_from_url_ignores_host_only_segment() {
    assert_eq!(route_from_url("shop.example.com"), None);
    assert_eq!(
        route_from_url("//shop.example.com/a/b/").as_deref(),
        Some("b")
    );
}

#[test]
fn safe_file_stem_replaces_separators() {
    assert_eq!(safe_file_stem("black/white", "img"), "black-white");
    assert_eq!(safe_file_stem("Jet Black", "img"), "jet-black");
    assert_eq!(safe_file_stem("a\\b", "img"), "a-b");
}

#[test]
fn safe_file_stem_cannot_climb_out_of_the_directory() {
    assert_eq!(safe_file_stem("../../x", "img"), "x");
    assert_eq!(safe_file_stem("..", "img"), "img");
    assert_eq!(safe_file_stem("", "img"), "img");
}

#[test]
fn explicit_scheme_for_protocol_relative_urls() {
    assert_eq!(
        with_explicit_scheme("//cdn.example.com/a.png"),
        "https://cdn.example.com/a.png"
    );
}

#[test]
fn explicit_scheme_leaves_absolute_urls_alone() {
    assert_eq!(
        with_explicit_scheme("http://cdn.example.com/a.png"),
        "http://cdn.example.com/a.png"
    );
}

#[test]
fn explicit_scheme_added_to_bare_host() {
    assert_eq!(
        with_explicit_scheme("cdn.example.com/a.png"),
        "https://cdn.example.com/a.png"
    );
}

#[test]
fn extension_from_url_path() {
    assert_eq!(infer_extension("https://cdn.example.com/x/shoe.PNG", "png"), "png");
    assert_eq!(
        infer_extension("https://cdn.example.com/x/shoe.webp?v=3&w=800", "png"),
        "webp"
    );
    assert_eq!(infer_extension("https://cdn.example.com/clip.mp4#t=1", "mp4"), "mp4");
}

#[test]
fn extension_falls_back_when_missing_or_odd() {
    assert_eq!(infer_extension("https://cdn.example.com/x/shoe", "png"), "png");
    assert_eq!(infer_extension("https://cdn.example.com", "png"), "png");
    assert_eq!(
        infer_extension("https://cdn.example.com/x/file.not-an-ext", "jpg"),
        "jpg"
    );
}

#[test]
fn product_meta_trims_and_drops_blanks() {
    let page = ProductPage {
        title: Some("  Tree Runner ".to_string()),
        price: Some(" ".to_string()),
        sizes: urls(&["8", " ", "9 "]),
        big_images: Vec::new(),
        material: Some("Eucalyptus tree fiber".to_string()),
        best_for: None,
    };
    let meta = page.meta("fallback");
    assert_eq!(meta.title, "Tree Runner");
    assert_eq!(meta.price, None);
    assert_eq!(meta.sizes, urls(&["8", "9"]));
    assert_eq!(meta.material.as_deref(), Some("Eucalyptus tree fiber"));
}

#[test]
fn product_meta_uses_fallback_title() {
    let meta = ProductPage::default().meta("tree-runner");
    assert_eq!(meta.title, "tree-runner");
}

#[test]
fn product_meta_serializes_camel_case_without_empty_options() {
    let meta = ProductMeta {
        title: "Tree Runner".to_string(),
        price: Some("$98".to_string()),
        sizes: urls(&["8"]),
        material: None,
        best_for: Some("Everyday wear".to_string()),
    };
    let value = serde_json::to_value(&meta).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "title": "Tree Runner",
            "price": "$98",
            "sizes": ["8"],
            "bestFor": "Everyday wear"
        })
    );
}

#[test]
fn variant_record_uses_first_upload_as_slider() {
    let variant = Variant {
        color_name: "Jet Black".to_string(),
        color_type: "classic".to_string(),
        rgb_or_pattern: "rgb(0, 0, 0)".to_string(),
        images: urls(&["//c/a.png"]),
    };
    let record = VariantRecord::new(&variant, urls(&["https://dl/a", "https://dl/b"]));
    let value = serde_json::to_value(&record).unwrap();
    assert_eq!(
        value,
        serde_json::json!({
            "imgs": ["https://dl/a", "https://dl/b"],
            "colorName": "Jet Black",
            "rgb": "rgb(0, 0, 0)",
            "type": "classic",
            "sliderImg": "https://dl/a"
        })
    );
}
