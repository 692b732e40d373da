use std::cell::RefCell;
use std::rc::Rc;

use dimchart::core::Key;
use dimchart::data::MemoryTable;
use dimchart::error::{ChartError, ChartResult};
use dimchart::filters::{Filter, FilterInput};
use dimchart::render::{ChartRenderer, ChartView};
use dimchart::{Chart, ChartGroupRegistry, DEFAULT_CHART_GROUP, SharedChart};

struct Row {
    bucket: f64,
    amount: f64,
}

struct SequencedRenderer {
    name: &'static str,
    fail: bool,
    sequence: Rc<RefCell<Vec<&'static str>>>,
}

impl ChartRenderer for SequencedRenderer {
    fn draw_full(&mut self, _view: &ChartView<'_>) -> ChartResult<()> {
        self.sequence.borrow_mut().push(self.name);
        if self.fail {
            return Err(ChartError::InvalidData("backend exploded".to_owned()));
        }
        Ok(())
    }

    fn draw_incremental(&mut self, view: &ChartView<'_>) -> ChartResult<()> {
        self.draw_full(view)
    }
}

fn chart_in_group(
    name: &'static str,
    group_name: &str,
    fail: bool,
    sequence: &Rc<RefCell<Vec<&'static str>>>,
) -> SharedChart {
    let table = MemoryTable::new(vec![Row { bucket: 1.0, amount: 1.0 }]);
    let dimension = table.dimension(|r| Key::num(r.bucket));
    let group = dimension.group(|r| r.amount);

    let renderer = SequencedRenderer {
        name,
        fail,
        sequence: Rc::clone(sequence),
    };
    let mut chart = Chart::with_renderer(name, Box::new(renderer));
    chart.set_dimension(dimension.into_shared());
    chart.set_group_named(group.into_shared(), "amounts");
    chart.set_chart_group(group_name);
    Rc::new(RefCell::new(chart))
}

#[test]
fn redraw_all_visits_each_member_once_in_registration_order() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    let first = chart_in_group("#one", "g1", true, &sequence);
    let second = chart_in_group("#two", "g1", false, &sequence);
    let third = chart_in_group("#three", "g1", false, &sequence);
    registry.register(&first);
    registry.register(&second);
    registry.register(&third);

    registry.redraw_all("g1");

    // The first chart throws; the remaining charts are still attempted.
    assert_eq!(*sequence.borrow(), vec!["#one", "#two", "#three"]);
}

#[test]
fn render_all_isolates_member_failures() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    registry.register(&chart_in_group("#bad", "g1", true, &sequence));
    registry.register(&chart_in_group("#good", "g1", false, &sequence));

    registry.render_all("g1");
    assert_eq!(*sequence.borrow(), vec!["#bad", "#good"]);
}

#[test]
fn groups_are_independent() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    registry.register(&chart_in_group("#a", "g1", false, &sequence));
    registry.register(&chart_in_group("#b", "g2", false, &sequence));

    registry.redraw_all("g1");
    assert_eq!(*sequence.borrow(), vec!["#a"]);

    registry.redraw_all("missing-group");
    assert_eq!(sequence.borrow().len(), 1);
}

#[test]
fn a_chart_belongs_to_exactly_one_group() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    let chart = chart_in_group("#mover", "g1", false, &sequence);
    registry.register(&chart);
    assert_eq!(registry.chart_count("g1"), 1);

    chart.borrow_mut().set_chart_group("g2");
    registry.register(&chart);

    assert_eq!(registry.chart_count("g1"), 0, "reassignment leaves the old bucket");
    assert_eq!(registry.chart_count("g2"), 1);
    // The emptied bucket persists rather than being torn down.
    assert!(registry.group_names().contains(&"g1"));
}

#[test]
fn deregister_and_clear_manage_membership() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    let chart = chart_in_group("#member", "g1", false, &sequence);
    registry.register(&chart);
    assert!(registry.has_chart(&chart));

    assert!(registry.deregister(&chart));
    assert!(!registry.has_chart(&chart));
    assert!(!registry.deregister(&chart));

    registry.register(&chart);
    registry.clear();
    assert!(!registry.has_chart(&chart));
    assert!(registry.group_names().is_empty());
}

#[test]
fn charts_default_to_the_default_chart_group() {
    let chart = Chart::new("#defaulted");
    assert_eq!(chart.chart_group(), DEFAULT_CHART_GROUP);
}

#[test]
fn filter_all_clears_every_member_chart() {
    let sequence = Rc::new(RefCell::new(Vec::new()));
    let mut registry = ChartGroupRegistry::new();

    let first = chart_in_group("#f1", "g1", false, &sequence);
    let second = chart_in_group("#f2", "g1", false, &sequence);
    registry.register(&first);
    registry.register(&second);

    first
        .borrow_mut()
        .filter(FilterInput::One(Filter::exact(Key::num(1.0))));
    second
        .borrow_mut()
        .filter(FilterInput::One(Filter::exact(Key::num(1.0))));

    registry.filter_all("g1");
    assert!(!first.borrow().has_filter());
    assert!(!second.borrow().has_filter());
}

#[test]
fn linked_charts_stay_consistent_through_click_and_group_redraw() {
    struct Sale {
        region: &'static str,
        product: &'static str,
        amount: f64,
    }

    let table = MemoryTable::new(vec![
        Sale { region: "east", product: "widget", amount: 10.0 },
        Sale { region: "east", product: "gadget", amount: 20.0 },
        Sale { region: "west", product: "widget", amount: 5.0 },
        Sale { region: "west", product: "gadget", amount: 7.0 },
    ]);

    let region_dim = table.dimension(|s| Key::text(s.region));
    let region_group = region_dim.group(|s| s.amount);
    let product_dim = table.dimension(|s| Key::text(s.product));
    let product_group = product_dim.group(|s| s.amount);

    let mut region_chart = Chart::new("#regions");
    region_chart.set_dimension(region_dim.into_shared());
    region_chart.set_group_named(region_group.into_shared(), "sales");
    region_chart.set_chart_group("dashboard");

    let mut product_chart = Chart::new("#products");
    product_chart.set_dimension(product_dim.into_shared());
    product_chart.set_group_named(product_group.into_shared(), "sales");
    product_chart.set_chart_group("dashboard");

    let region_chart: SharedChart = Rc::new(RefCell::new(region_chart));
    let product_chart: SharedChart = Rc::new(RefCell::new(product_chart));

    let mut registry = ChartGroupRegistry::new();
    registry.register(&region_chart);
    registry.register(&product_chart);
    registry.render_all("dashboard");

    // Click "east" on the region chart, then redraw the whole group.
    let east = dimchart::core::GroupRow::new(Key::text("east"), 30.0);
    region_chart.borrow_mut().on_click(&east);
    registry.redraw_all("dashboard");

    // The product chart now aggregates east-only records.
    let products = product_chart.borrow_mut().data().expect("product data");
    let values: Vec<f64> = products[0].values().iter().map(|p| p.data.value).collect();
    assert_eq!(values, vec![20.0, 10.0]);

    // The region chart keeps showing all regions: groups ignore their own
    // dimension's filters.
    let regions = region_chart.borrow_mut().data().expect("region data");
    assert_eq!(regions[0].values().len(), 2);

    // Toggling the same key off restores the unfiltered aggregates.
    region_chart.borrow_mut().on_click(&east);
    registry.redraw_all("dashboard");
    let products = product_chart.borrow_mut().data().expect("product data");
    let values: Vec<f64> = products[0].values().iter().map(|p| p.data.value).collect();
    assert_eq!(values, vec![27.0, 15.0]);
}
