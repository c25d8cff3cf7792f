use std::fmt::Write as _;

use crate::compact::compact;
use crate::features::langs::LangShare;

use super::colors::color_for;

/// 卡片整体宽度
const WIDTH: u32 = 350;
/// 色条左边距，也是图例的水平基准
const MARGIN: u32 = 30;
/// 色条总长度（width - margin * 2）
const BAR_LENGTH: u32 = 290;
/// 图例圆点半径
const DOT_RADIUS: u32 = 5;
/// 图例行高
const ROW_HEIGHT: u32 = 20;
/// 色条以上的固定头部高度
const HEADER_HEIGHT: u32 = 70;

/// 未指定背景色时的默认值
pub const DEFAULT_BACKGROUND: &str = "#3c4043";

/// 语言占比卡片。
///
/// 纯函数：同样的 `shares` 与背景色永远产出字节相同的文档。
/// 结构为一条按占比分段的水平色条加两列图例；`shares` 为空时仍产出
/// 合法的空文档（零语言用户的稳态）。
pub fn render_lang_card(shares: &[LangShare], background: &str) -> String {
    let height = HEADER_HEIGHT + shares.len().div_ceil(2) as u32 * ROW_HEIGHT;

    let svg = format!(
        "<svg width='{WIDTH}' height='{height}' xmlns='http://www.w3.org/2000/svg'>
            {style}
            <rect width='{WIDTH}' height='{height}' fill='{background}' />
            <g class='bar'>
                {bar}
            </g>
            <g class='legend'>
                {legend}
            </g>
        </svg>",
        style = style_block(),
        bar = lang_bar(shares),
        legend = lang_legend(shares),
    );

    compact(&svg)
}

/// “尚无已完成的计算结果”占位卡片。
///
/// 固定文案、固定尺寸，与 `shares` 无关。
pub fn render_placeholder_card(background: &str) -> String {
    let height = 100;

    let svg = format!(
        "<svg width='{WIDTH}' height='{height}' xmlns='http://www.w3.org/2000/svg'>
            {style}
            <rect width='{WIDTH}' height='{height}' fill='{background}' />
            <g class='bar'>
                <text>Card is not ready yet.</text>
            </g>
            <g class='legend'>
                <text>Your request was queued, check back shortly.</text>
            </g>
        </svg>",
        style = style_block(),
    );

    compact(&svg)
}

fn style_block() -> String {
    let text_shift = DOT_RADIUS + 10;
    format!(
        "<style>
            text {{
                fill: white;
                font-size: 12px;
                font-family: Arial;
                transform: translate({text_shift}px, {DOT_RADIUS}px);
            }}
            circle {{
                r: {DOT_RADIUS}px;
            }}
            line {{
                stroke-width: 10px;
            }}
            .bar {{
                transform: translate(0, 30px);
            }}
            .legend {{
                transform: translate(0, 60px);
            }}
        </style>"
    )
}

/// 色条：各语言按占比分段，从左边距起首尾相接。
fn lang_bar(shares: &[LangShare]) -> String {
    let mut out = String::new();
    let mut start = MARGIN as f64;

    for share in shares {
        let end = BAR_LENGTH as f64 * share.percent + start;
        let color = color_for(&share.name);
        // 坐标固定两位小数，避免浮点误差放大成超长十进制串
        let _ = write!(
            out,
            "<line x1='{start:.2}' x2='{end:.2}' stroke='{color}' />"
        );
        start = end;
    }

    out
}

/// 图例：按下标奇偶交替左右两列，每两条换一行。
fn lang_legend(shares: &[LangShare]) -> String {
    let mut out = String::new();
    let mut y = 0u32;

    for (i, share) in shares.iter().enumerate() {
        let x = if i % 2 == 0 {
            MARGIN + DOT_RADIUS
        } else {
            175 + DOT_RADIUS
        };
        out.push_str(&legend_entry(share, x, y));
        if i % 2 == 1 {
            y += ROW_HEIGHT;
        }
    }

    out
}

fn legend_entry(share: &LangShare, x: u32, y: u32) -> String {
    let color = color_for(&share.name);
    let name = xml_escape(&share.name);
    let percent = share.percent * 100.0;
    format!(
        "<g transform='translate({x}, {y})'>
            <circle fill='{color}'/>
            <text>{name} {percent:.2}%</text>
        </g>"
    )
}

/// 语言名进入文本节点前的最小 XML 转义。
fn xml_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}
