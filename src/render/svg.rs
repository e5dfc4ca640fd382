use crate::layout::{Anchor, BAR_HALF_HEIGHT, Baseline, Geometry, Label, Shape};
use crate::render::RenderConfig;
use crate::units::{Ch, EMBED_FONT_PX, Px, UnitMode};

const MARKER_RADIUS: Px = Px(3.0);
const LANE_STROKE: &str = "#bbbbbb";

const DARK_STYLE: &str = r#"    @media (prefers-color-scheme: dark) {
      text { fill: #eceff4; }
      line, rect { stroke: #eceff4; }
      circle { fill: #eceff4; }
    }"#;

/// Render resolved geometry as a standalone SVG document.
///
/// Coordinates are copied from `geometry` as-is; only their units depend on
/// `config.mode`.
pub fn render_svg(geometry: &Geometry, config: &RenderConfig) -> String {
    let m = config.mode;
    let mut out: Vec<String> = Vec::new();

    let font = match m {
        UnitMode::Scalable => String::new(),
        UnitMode::Embed => format!(r#" font-size="{}""#, Px(EMBED_FONT_PX)),
    };
    out.push(format!(
        r#"<svg version="1.1" xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" font-family="monospace"{}>"#,
        m.x(geometry.width),
        m.y(geometry.height),
        font
    ));
    out.push(header_style(m));

    for lane in &geometry.lanes {
        out.push(format!(
            r#"<line class="lane" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" />"#,
            m.x(geometry.axis_start),
            m.y(lane.axis_y),
            m.x(geometry.axis_end),
            m.y(lane.axis_y),
            LANE_STROKE
        ));
        out.push(text(m, "actor", &lane.label));
        if config.guidelines {
            for y in [lane.top, lane.top + lane.height] {
                out.push(format!(
                    r#"<line class="guideline" x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" stroke-dasharray="5" />"#,
                    m.x(Ch(0.0)),
                    m.y(y),
                    m.x(geometry.width),
                    m.y(y)
                ));
            }
        }
    }

    for span in &geometry.spans {
        match span.shape {
            Shape::Rect { x0, x1 } => out.push(format!(
                r#"<rect class="span" x="{}" y="{}" width="{}" height="{}" fill="none" stroke="black" />"#,
                m.x(x0),
                m.y(span.y - BAR_HALF_HEIGHT),
                m.x(x1 - x0),
                m.y(BAR_HALF_HEIGHT * 2.0)
            )),
            Shape::Point { x } => out.push(format!(
                r#"<line class="point" x1="{}" y1="{}" x2="{}" y2="{}" stroke="black" />"#,
                m.x(x),
                m.y(span.y - BAR_HALF_HEIGHT),
                m.x(x),
                m.y(span.y + BAR_HALF_HEIGHT)
            )),
        }
        for label in &span.labels {
            out.push(text(m, "label", label));
        }
    }

    for marker in &geometry.markers {
        out.push(format!(
            r#"<circle class="marker" cx="{}" cy="{}" r="{}" />"#,
            m.x(marker.x),
            m.y(marker.y),
            MARKER_RADIUS
        ));
    }

    out.push("</svg>".to_string());
    out.join("\n")
}

fn header_style(m: UnitMode) -> String {
    let mut style = vec![
        "<defs>".to_string(),
        r#"  <style type="text/css">"#.to_string(),
        DARK_STYLE.to_string(),
    ];
    if m == UnitMode::Embed {
        style.push(format!(
            "    text {{ font-size: {}; font-family: monospace; }}",
            Px(EMBED_FONT_PX)
        ));
    }
    style.push("  </style>".to_string());
    style.push("</defs>".to_string());
    style.join("\n")
}

fn text(m: UnitMode, class: &str, label: &Label) -> String {
    let anchor = match label.anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    };
    let baseline = match label.baseline {
        Baseline::Bottom => "alphabetic",
        Baseline::Middle => "middle",
    };
    format!(
        r#"<text class="{}" x="{}" y="{}" text-anchor="{}" dominant-baseline="{}">{}</text>"#,
        class,
        m.x(label.x),
        m.y(label.y),
        anchor,
        baseline,
        escape_xml(&label.text)
    )
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
