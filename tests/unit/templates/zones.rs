use super::*;
use crate::references::archetype::Rhythm;

fn spacing() -> SpacingTokens {
    SpacingTokens {
        margin_mm: 16.0,
        gutter_mm: 6.0,
        radius_mm: 2.5,
        stroke_mm: 0.5,
    }
}

fn tunings() -> Vec<LayoutTuning> {
    let mut out = vec![LayoutTuning::balanced()];
    for (columns, hero, density, rhythm) in [
        (1, 0.3, 0.2, Rhythm::Tight),
        (3, 0.7, 0.8, Rhythm::Airy),
        (4, 0.5, 0.65, Rhythm::Balanced),
    ] {
        out.push(LayoutTuning {
            columns,
            hero_ratio: hero,
            card_density: density,
            header_ratio: 0.12,
            footer_ratio: 0.09,
            rhythm,
        });
    }
    out
}

fn pages() -> Vec<PageSizeMm> {
    [(210.0, 297.0), (297.0, 210.0), (338.67, 190.5), (200.0, 200.0), (100.0, 100.0)]
        .iter()
        .map(|&(w, h)| PageSizeMm::new(w, h).unwrap())
        .collect()
}

#[test]
fn content_zones_stay_inside_content_rect() {
    for page in pages() {
        for tuning in tunings() {
            let frame = ZoneFrame::new(page, &spacing(), &tuning);
            assert!(frame.header.overlap_area(&frame.content) <= 1e-9);
            assert!(frame.footer.overlap_area(&frame.content) <= 1e-9);
            for template in TemplateId::ALL {
                for z in build_zones(template, page, &spacing(), Some(&tuning)) {
                    if z.reserved {
                        continue;
                    }
                    assert!(
                        frame.content.contains(&z.rect(), 1e-6),
                        "{template} zone {} escapes content on {page:?}",
                        z.id
                    );
                }
            }
        }
    }
}

#[test]
fn content_zones_do_not_overlap_each_other() {
    for page in pages() {
        for tuning in tunings() {
            for template in TemplateId::ALL {
                let zones = build_zones(template, page, &spacing(), Some(&tuning));
                for (i, a) in zones.iter().enumerate() {
                    for b in zones.iter().skip(i + 1) {
                        assert!(
                            a.rect().overlap_area(&b.rect()) <= 1e-6,
                            "{template}: {} overlaps {}",
                            a.id,
                            b.id
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn every_template_reserves_header_and_footer() {
    let page = PageSizeMm::new(210.0, 297.0).unwrap();
    for template in TemplateId::ALL {
        let zones = build_zones(template, page, &spacing(), None);
        assert!(zone(&zones, ZonePurpose::Header).is_some_and(|z| z.reserved));
        assert!(zone(&zones, ZonePurpose::Footer).is_some_and(|z| z.reserved));
        assert!(zone(&zones, ZonePurpose::Title).is_some());
    }
}

#[test]
fn rhythm_scales_gutter_and_bands_clamp() {
    let page = PageSizeMm::new(210.0, 297.0).unwrap();
    let mut t = LayoutTuning::balanced();
    t.rhythm = Rhythm::Tight;
    let tight = ZoneFrame::new(page, &spacing(), &t);
    t.rhythm = Rhythm::Airy;
    let airy = ZoneFrame::new(page, &spacing(), &t);
    assert!((tight.gutter_mm - 6.0 * 0.88).abs() < 1e-9);
    assert!((airy.gutter_mm - 6.0 * 1.12).abs() < 1e-9);

    t.header_ratio = 0.5;
    t.footer_ratio = 0.0;
    let f = ZoneFrame::new(page, &spacing(), &t);
    assert_eq!(f.header.h_mm, HEADER_HEIGHT_RANGE.1);
    assert_eq!(f.footer.h_mm, FOOTER_HEIGHT_RANGE.0);
}

#[test]
fn columns_shift_split_ratio() {
    assert!(column_split_ratio(1) > column_split_ratio(2));
    assert!(column_split_ratio(3) > column_split_ratio(4));
    let page = PageSizeMm::new(297.0, 210.0).unwrap();
    let mut t = LayoutTuning::balanced();
    t.columns = 4;
    let zones = build_zones(TemplateId::SplitMediaLeft, page, &spacing(), Some(&t));
    let media = zone(&zones, ZonePurpose::Media).unwrap();
    let body = zone(&zones, ZonePurpose::Body).unwrap();
    assert!(media.w_mm < body.w_mm);
}
