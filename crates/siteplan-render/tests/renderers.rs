//! Integration tests for the SVG, text and Excel renderers

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use siteplan_core::{
    CriticalPath, DependencyType, Granularity, Locale, Renderer, ScheduleTask, ScheduleView,
};
use siteplan_render::{
    ExcelRenderer, HealthTextRenderer, SvgRenderer, TimelineTextRenderer, WbsTextRenderer,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn residential_building() -> ScheduleView {
    let tasks = vec![
        ScheduleTask::new(100)
            .wbs("1")
            .description("Infraestrutura")
            .planned(date(2025, 3, 3), date(2025, 4, 30))
            .planned_cost(dec!(250000))
            .complete(60),
        ScheduleTask::new(101)
            .wbs("1.1")
            .description("Estacas")
            .level(1)
            .planned(date(2025, 3, 3), date(2025, 3, 28))
            .actual(date(2025, 3, 5), Some(date(2025, 4, 2)))
            .planned_cost(dec!(120000))
            .complete(100),
        ScheduleTask::new(102)
            .wbs("1.2")
            .description("Blocos e baldrames")
            .level(1)
            .planned(date(2025, 3, 31), date(2025, 4, 30))
            .actual(date(2025, 4, 3), None)
            .planned_cost(dec!(130000))
            .depends_on(101, DependencyType::FinishToStart, 2)
            .complete(20),
        ScheduleTask::new(103)
            .wbs("M1")
            .description("Infraestrutura liberada")
            .planned(date(2025, 4, 30), date(2025, 4, 30))
            .milestone(),
    ];
    ScheduleView::new(tasks).with_critical_path(CriticalPath::new([101, 102, 103], 58))
}

#[test]
fn svg_gantt_for_building() {
    let svg = SvgRenderer::new()
        .title("Residencial Aurora")
        .granularity(Granularity::Week)
        .today(date(2025, 4, 10))
        .render(&residential_building())
        .unwrap();

    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("Residencial Aurora"));
    assert!(svg.contains("Blocos e baldrames"));
    assert!(svg.contains("class=\"progress\""));
    assert!(svg.contains("Duração total: 58 dias"));
}

#[test]
fn text_outputs_for_building() {
    let view = residential_building();

    let timeline = TimelineTextRenderer::new(Granularity::Month, date(2025, 4, 10))
        .render(&view)
        .unwrap();
    assert!(timeline.contains("mar/25 | abr/25 | mai/25"));

    let wbs = WbsTextRenderer::new(Locale::PtBr).render(&view).unwrap();
    assert!(wbs.contains("03/03/2025"));
    assert!(wbs.contains("Concluído"));

    // no health in the view
    assert!(HealthTextRenderer::default().render(&view).is_err());
}

#[test]
fn excel_export_for_building() {
    let bytes = ExcelRenderer::new().render(&residential_building()).unwrap();
    assert_eq!(&bytes[0..2], b"PK");
}
