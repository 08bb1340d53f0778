use super::*;

fn img(name: &str, w: u32, h: u32) -> ScannedImage {
    ScannedImage::new(name, Some(w), Some(h)).unwrap()
}

#[test]
fn keyword_order_resolves_ties() {
    // "dashboard-screen" hits chart before ui.
    let l = classify(&img("dashboard-screen.png", 100, 100));
    assert_eq!(l.topic, Topic::Chart);
    assert!(l.is_proof_asset);
    assert!(!l.is_low_signal);
}

#[test]
fn separators_are_stripped_before_matching() {
    let l = classify(&img("Team_Photo-01.JPG", 100, 100));
    assert_eq!(l.topic, Topic::People);
    assert!(!l.is_proof_asset);
    // Directory names do not contribute.
    let l = classify(&img("charts/IMG_0001.png", 100, 100));
    assert_eq!(l.topic, Topic::Generic);
}

#[test]
fn aspect_fallback_is_low_signal() {
    assert_eq!(classify(&img("IMG_1.png", 1920, 1080)).topic, Topic::Ui);
    assert_eq!(classify(&img("IMG_2.png", 600, 900)).topic, Topic::Photo);
    let square = classify(&img("IMG_3.png", 500, 500));
    assert_eq!(square.topic, Topic::Generic);
    assert!(square.is_low_signal);
    let unknown = classify(&ScannedImage::new("IMG_4.png", None, None).unwrap());
    assert_eq!(unknown.topic, Topic::Generic);
}

#[test]
fn clusters_sort_by_size_then_topic_order() {
    let set = classify_all(&[
        img("hero-photo.png", 10, 10),
        img("team.png", 10, 10),
        img("team-2.png", 10, 10),
        img("kpi.png", 10, 10),
        img("IMG_9.png", 10, 10),
    ]);
    let topics: Vec<Topic> = set.clusters.iter().map(|c| c.topic).collect();
    assert_eq!(
        topics,
        vec![Topic::People, Topic::Chart, Topic::Photo, Topic::Generic]
    );
    assert_eq!(set.low_signal_count(), 1);
    assert_eq!(set.proof_count(), 1);
    assert_eq!(set.clusters[3].low_signal_count, 1);
}

#[test]
fn keywords_match_whole_words_only() {
    assert_eq!(classify(&img("building.png", 100, 100)).topic, Topic::Generic);
    assert_eq!(classify(&img("style-guide.jpg", 100, 100)).topic, Topic::Generic);
    assert_eq!(classify(&img("happy-customers.jpg", 100, 100)).topic, Topic::Generic);
    assert_eq!(classify(&img("statue.png", 100, 100)).topic, Topic::Generic);
    assert_eq!(classify(&img("checkout-ui.png", 100, 100)).topic, Topic::Ui);
    assert_eq!(classify(&img("web_app.png", 100, 100)).topic, Topic::Ui);
}

#[test]
fn plurals_and_camel_case_split_into_words() {
    assert_eq!(classify(&img("screenshots.png", 100, 100)).topic, Topic::Ui);
    assert_eq!(classify(&img("q3-stats.png", 100, 100)).topic, Topic::Chart);
    assert_eq!(classify(&img("TeamPhoto2024.jpg", 100, 100)).topic, Topic::People);
    assert_eq!(
        filename_tokens("shots/RevenueChart_v2.PNG"),
        vec!["revenue", "chart", "v", "2"]
    );
}
