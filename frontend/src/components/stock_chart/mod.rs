pub mod renderer;

use std::rc::Rc;

use plotters::style::RGBColor;
use shared::{ChartConfig, ChartSelection, Company, DataPoint, Month, Tooltip};
use web_sys::{Element, HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::services::logging::Logger;
use renderer::{ChartError, HitMap, Series};

const COMPONENT: &str = "StockChart";

#[derive(Properties, PartialEq)]
pub struct StockChartProps {
    pub data: Rc<Vec<DataPoint>>,
    #[prop_or_default]
    pub config: ChartConfig,
}

pub enum Msg {
    SetCompany(Company),
    SetMonth(Month),
    PointerMove(PointerPosition),
    PointerLeave,
}

/// Pointer location relative to the chart container and to the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub x: f64,
    pub y: f64,
    pub page_x: i32,
    pub page_y: i32,
}

/// A visible tooltip and its page position
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveTooltip {
    pub tooltip: Tooltip,
    pub left: i32,
    pub top: i32,
}

impl ActiveTooltip {
    /// Tooltip for the marker under `pointer`, if any
    pub fn at(
        hit_map: &HitMap,
        filtered: &[DataPoint],
        pointer: PointerPosition,
        config: &ChartConfig,
    ) -> Option<Self> {
        let marker = hit_map.hit(pointer.x, pointer.y)?;
        let point = filtered.get(marker.point_index)?;
        Some(Self {
            tooltip: Tooltip::for_point(point),
            left: pointer.page_x + config.tooltip_offset_x,
            top: pointer.page_y + config.tooltip_offset_y,
        })
    }
}

/// Open/close price chart with company and month selectors.
///
/// The chart container is written only by [`StockChart::redraw`]; the
/// virtual DOM never renders children into it.
pub struct StockChart {
    container_ref: NodeRef,
    selection: ChartSelection,
    filtered: Vec<DataPoint>,
    hit_map: HitMap,
    needs_redraw: bool,
    tooltip: Option<ActiveTooltip>,
}

impl Component for StockChart {
    type Message = Msg;
    type Properties = StockChartProps;

    fn create(ctx: &Context<Self>) -> Self {
        let selection = ChartSelection::default();
        Self {
            container_ref: NodeRef::default(),
            selection,
            filtered: selection.filter(&ctx.props().data),
            hit_map: HitMap::default(),
            needs_redraw: true,
            tooltip: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            Msg::SetCompany(company) => {
                // Re-selecting the checked radio must not clear the chart
                if company == self.selection.company {
                    return false;
                }
                self.selection.company = company;
                self.refilter(&ctx.props().data);
                true
            }
            Msg::SetMonth(month) => {
                if month == self.selection.month {
                    return false;
                }
                self.selection.month = month;
                self.refilter(&ctx.props().data);
                true
            }
            Msg::PointerMove(pointer) => {
                // Only re-render when the pointer enters, leaves or switches markers
                let next = ActiveTooltip::at(&self.hit_map, &self.filtered, pointer, &ctx.props().config);
                if next == self.tooltip {
                    return false;
                }
                self.tooltip = next;
                true
            }
            Msg::PointerLeave => self.tooltip.take().is_some(),
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old_props: &Self::Properties) -> bool {
        let props = ctx.props();
        // A new dataset or layout invalidates both the filtered set and the drawing
        if !Rc::ptr_eq(&props.data, &old_props.data) || props.config != old_props.config {
            self.refilter(&props.data);
        }
        true
    }

    fn rendered(&mut self, ctx: &Context<Self>, _first_render: bool) {
        // The container exists only after the first view; tooltip-only
        // renders leave needs_redraw unset and keep the current drawing
        if self.needs_redraw {
            self.redraw(&ctx.props().config);
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let link = ctx.link();
        let config = &ctx.props().config;

        let on_company_change = link.batch_callback(|e: Event| {
            let input: HtmlInputElement = e.target_unchecked_into();
            match input.value().parse::<Company>() {
                Ok(company) => Some(Msg::SetCompany(company)),
                Err(err) => {
                    Logger::warn_with_component(COMPONENT, &err.to_string());
                    None
                }
            }
        });
        let on_month_change = link.batch_callback(|e: Event| {
            let select: HtmlSelectElement = e.target_unchecked_into();
            match select.value().parse::<Month>() {
                Ok(month) => Some(Msg::SetMonth(month)),
                Err(err) => {
                    Logger::warn_with_component(COMPONENT, &err.to_string());
                    None
                }
            }
        });

        let container_ref = self.container_ref.clone();
        let on_pointer_move = link.batch_callback(move |e: MouseEvent| {
            let container = container_ref.cast::<Element>()?;
            let rect = container.get_bounding_client_rect();
            Some(Msg::PointerMove(PointerPosition {
                x: e.client_x() as f64 - rect.left(),
                y: e.client_y() as f64 - rect.top(),
                page_x: e.page_x(),
                page_y: e.page_y(),
            }))
        });
        let on_pointer_leave = link.callback(|_: MouseEvent| Msg::PointerLeave);

        html! {
            <div class="stock-chart">
                <div class="selectors">
                    <div class="company-selector">
                        <label>{"Company: "}</label>
                        {for Company::ALL.iter().map(|company| html! {
                            <label key={company.as_str()}>
                                <input
                                    type="radio"
                                    name="company"
                                    value={company.as_str()}
                                    checked={*company == self.selection.company}
                                    onchange={on_company_change.clone()}
                                />
                                {company.as_str()}
                            </label>
                        })}
                    </div>
                    <div class="month-selector">
                        <label>{"Month: "}</label>
                        <select onchange={on_month_change}>
                            {for Month::ALL.iter().map(|month| html! {
                                <option
                                    key={month.name()}
                                    value={month.name()}
                                    selected={*month == self.selection.month}
                                >
                                    {month.name()}
                                </option>
                            })}
                        </select>
                    </div>
                </div>

                <div class="chart-legend-container">
                    <div class="chart-area" style={format!("position: relative; width: {}px; height: {}px;", config.width, config.height)}>
                        <div
                            ref={self.container_ref.clone()}
                            class="chart-container"
                            onmousemove={on_pointer_move}
                            onmouseleave={on_pointer_leave}
                        ></div>
                        {if self.filtered.is_empty() {
                            html! {
                                <div class="chart-empty" style="position: absolute; top: 45%; width: 100%; text-align: center;">
                                    <p>{format!("No data for {} in {}", self.selection.company, self.selection.month)}</p>
                                </div>
                            }
                        } else {
                            html! {}
                        }}
                    </div>

                    <div class="legend">
                        {for [Series::Open, Series::Close].iter().map(|series| html! {
                            <div class="legend-item" key={series.label()}>
                                <div
                                    class={format!("legend-{}", series.label().to_lowercase())}
                                    style={format!("width: 12px; height: 12px; display: inline-block; margin-right: 6px; background: {};", css_color(series.color()))}
                                ></div>
                                <span>{series.label()}</span>
                            </div>
                        })}
                    </div>
                </div>

                {self.view_tooltip()}
            </div>
        }
    }
}

impl StockChart {
    fn refilter(&mut self, data: &[DataPoint]) {
        self.filtered = self.selection.filter(data);
        self.tooltip = None;
        self.needs_redraw = true;
    }

    /// Clear the chart container and draw the current filtered set from scratch
    fn redraw(&mut self, config: &ChartConfig) {
        let container = match self.container_ref.cast::<Element>() {
            Some(container) => container,
            None => return,
        };

        // Drop the old drawing and its markers before anything new is drawn,
        // so a failed render leaves an empty chart rather than a stale one
        container.set_inner_html("");
        self.hit_map = HitMap::default();
        self.needs_redraw = false;

        match renderer::render_svg(&self.filtered, config) {
            Ok(rendered) => {
                container.set_inner_html(&rendered.svg);
                self.hit_map = rendered.hit_map;
                Logger::debug_with_component(
                    COMPONENT,
                    &format!(
                        "Drew {} points for {} in {}",
                        self.filtered.len(),
                        self.selection.company,
                        self.selection.month
                    ),
                );
            }
            Err(ChartError::EmptySelection) => {
                // The view shows the placeholder; the container stays empty
                Logger::info_with_component(
                    COMPONENT,
                    &format!("No data for {} in {}", self.selection.company, self.selection.month),
                );
            }
            Err(err) => {
                Logger::error_with_component(COMPONENT, &err.to_string());
            }
        }
    }

    fn view_tooltip(&self) -> Html {
        match &self.tooltip {
            Some(active) => html! {
                <div
                    class="tooltip"
                    style={format!("position: absolute; visibility: visible; left: {}px; top: {}px;", active.left, active.top)}
                >
                    {for active.tooltip.lines().iter().map(|line| html! { <div>{line}</div> })}
                </div>
            },
            None => html! {
                <div class="tooltip" style="position: absolute; visibility: hidden;"></div>
            },
        }
    }
}

fn css_color(color: RGBColor) -> String {
    format!("rgb({}, {}, {})", color.0, color.1, color.2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use renderer::render_svg;

    fn scenario() -> Vec<DataPoint> {
        vec![
            DataPoint::new("Apple", NaiveDate::from_ymd_opt(2023, 11, 1).unwrap(), 100.0, 105.0),
            DataPoint::new("Apple", NaiveDate::from_ymd_opt(2023, 11, 2).unwrap(), 105.0, 103.0),
        ]
    }

    fn pointer_at(x: i32, y: i32) -> PointerPosition {
        PointerPosition {
            x: x as f64,
            y: y as f64,
            page_x: x + 200,
            page_y: y + 100,
        }
    }

    #[test]
    fn test_tooltip_placed_beside_pointer() {
        let config = ChartConfig::default();
        let filtered = ChartSelection::default().filter(&scenario());
        let rendered = render_svg(&filtered, &config).unwrap();
        let marker = rendered.hit_map.markers()[0];

        let active = ActiveTooltip::at(&rendered.hit_map, &filtered, pointer_at(marker.x, marker.y), &config).unwrap();
        assert_eq!(active.left, marker.x + 200 + 10);
        assert_eq!(active.top, marker.y + 100 - 10);
        assert_eq!(active.tooltip.lines()[1..].join(", "), "Open: 100.00, Close: 105.00, Diff: 5.00");
        assert_eq!(active.tooltip.date, "11/1/2023");
    }

    #[test]
    fn test_close_marker_tooltip() {
        let config = ChartConfig::default();
        let filtered = ChartSelection::default().filter(&scenario());
        let rendered = render_svg(&filtered, &config).unwrap();
        let marker = *rendered
            .hit_map
            .markers()
            .iter()
            .find(|m| m.series == Series::Close && m.point_index == 1)
            .unwrap();

        let active = ActiveTooltip::at(&rendered.hit_map, &filtered, pointer_at(marker.x, marker.y), &config).unwrap();
        assert_eq!(active.tooltip.lines()[1..].join(", "), "Open: 105.00, Close: 103.00, Diff: -2.00");
    }

    #[test]
    fn test_no_tooltip_off_marker_or_after_clear() {
        let config = ChartConfig::default();
        let filtered = ChartSelection::default().filter(&scenario());
        let rendered = render_svg(&filtered, &config).unwrap();

        assert!(ActiveTooltip::at(&rendered.hit_map, &filtered, pointer_at(1, 1), &config).is_none());

        let marker = rendered.hit_map.markers()[0];
        let cleared = HitMap::default();
        assert!(ActiveTooltip::at(&cleared, &filtered, pointer_at(marker.x, marker.y), &config).is_none());
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(RGBColor(102, 126, 234)), "rgb(102, 126, 234)");
    }

    #[test]
    fn test_props_creation() {
        let props = StockChartProps {
            data: Rc::new(scenario()),
            config: ChartConfig::default(),
        };
        assert_eq!(props.data.len(), 2);
        assert_eq!(props.config.width, 700);
    }
}
