//! The built-in glyph table.
//!
//! Declaration order matters: keyword matching scans this table top to
//! bottom and the first whole-word hit wins, so the most common intents sit
//! first within each domain block. IDs are immutable once published.

use crate::types::{Domain, GlyphDefinition};

fn glyph(
    id: &str,
    meaning: &str,
    pose: &str,
    symbol: &str,
    domain: Domain,
    keywords: &[&str],
    visual_hint: &str,
) -> GlyphDefinition {
    GlyphDefinition {
        id: id.to_string(),
        meaning: meaning.to_string(),
        pose: pose.to_string(),
        symbol: symbol.to_string(),
        domain,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
        visual_hint: visual_hint.to_string(),
    }
}

/// Build the full built-in table, in declaration order.
pub fn builtin_table() -> Vec<GlyphDefinition> {
    use Domain::*;
    vec![
        // Foundation: conversational primitives
        glyph(
            "Q01",
            "query",
            "head tilted, one arm raised",
            "?",
            Foundation,
            &["query", "ask", "question", "what", "how"],
            "question mark over tilted figure",
        ),
        glyph(
            "Q02",
            "respond",
            "both palms open forward",
            "!",
            Foundation,
            &["respond", "response", "answer", "reply"],
            "open palms offering",
        ),
        glyph(
            "Q03",
            "acknowledge",
            "single nod, hand to chest",
            "\u{2713}",
            Foundation,
            &["acknowledge", "ack", "received", "got"],
            "check over chest",
        ),
        glyph(
            "Q04",
            "deny",
            "crossed forearms",
            "\u{2715}",
            Foundation,
            &["deny", "refuse", "reject", "no"],
            "crossed arms X",
        ),
        glyph(
            "Q05",
            "greet",
            "open wave above head",
            "~",
            Foundation,
            &["greet", "hello", "hi", "welcome"],
            "waving arm arc",
        ),
        glyph(
            "Q06",
            "farewell",
            "slow lowering wave",
            "_",
            Foundation,
            &["farewell", "goodbye", "bye", "leave"],
            "descending wave",
        ),
        glyph(
            "Q07",
            "affirm",
            "both thumbs up",
            "+",
            Foundation,
            &["affirm", "yes", "agree", "confirm"],
            "double thumbs up",
        ),
        glyph(
            "Q08",
            "clarify",
            "hands cupped at ears",
            "\u{2248}",
            Foundation,
            &["clarify", "unclear", "repeat", "explain"],
            "cupped ears",
        ),
        // Crypto: trading and token operations
        glyph(
            "X01",
            "swap",
            "arms crossing mid-torso",
            "\u{21c4}",
            Crypto,
            &["swap", "exchange", "trade", "convert"],
            "two opposing arrows",
        ),
        glyph(
            "X02",
            "transfer",
            "one arm extended, palm down",
            "\u{2192}",
            Crypto,
            &["transfer", "move", "withdraw", "deposit"],
            "single right arrow",
        ),
        glyph(
            "X03",
            "price",
            "hand flat at eye level",
            "$",
            Crypto,
            &["price", "quote", "rate", "value", "worth"],
            "level hand with coin",
        ),
        glyph(
            "X04",
            "liquidity",
            "arms rippling outward",
            "\u{2652}",
            Crypto,
            &["liquidity", "pool", "depth", "provide"],
            "ripple lines",
        ),
        glyph(
            "X05",
            "stake",
            "both fists planted down",
            "\u{2693}",
            Crypto,
            &["stake", "lock", "bond", "delegate-stake"],
            "anchor planted",
        ),
        glyph(
            "X06",
            "unstake",
            "fists lifting upward",
            "\u{2b06}",
            Crypto,
            &["unstake", "unlock", "unbond", "release"],
            "anchor lifting",
        ),
        glyph(
            "X07",
            "yield",
            "palms cupped, rising",
            "%",
            Crypto,
            &["yield", "earn", "harvest", "reward", "apy"],
            "sprouting coin",
        ),
        glyph(
            "X08",
            "bridge",
            "arms spanning shoulder width",
            "\u{2194}",
            Crypto,
            &["bridge", "crosschain", "wrap", "port"],
            "arch between chains",
        ),
        // Agent: task delegation
        glyph(
            "A01",
            "assign task",
            "pointing forward, then down",
            "\u{25b8}",
            Agent,
            &["assign", "task", "do", "execute", "run"],
            "pointing finger to slot",
        ),
        glyph(
            "A02",
            "task complete",
            "arms raised in V",
            "\u{2714}",
            Agent,
            &["complete", "completed", "done", "finished"],
            "bold check in V",
        ),
        glyph(
            "A03",
            "task failed",
            "head down, arms dropped",
            "\u{2717}",
            Agent,
            &["failed", "failure", "error", "abort"],
            "slumped figure",
        ),
        glyph(
            "A04",
            "delegate",
            "hand passing to the side",
            "\u{21aa}",
            Agent,
            &["delegate", "forward", "handoff", "refer"],
            "sideways handoff",
        ),
        glyph(
            "A05",
            "capability",
            "arms flexed outward",
            "\u{2699}",
            Agent,
            &["capability", "can", "skill", "support"],
            "gear between arms",
        ),
        glyph(
            "A06",
            "negotiate",
            "two palms meeting halfway",
            "\u{2696}",
            Agent,
            &["negotiate", "offer", "counter", "bargain"],
            "balanced scales",
        ),
        glyph(
            "A07",
            "collaborate",
            "linked arms",
            "\u{221e}",
            Agent,
            &["collaborate", "together", "join", "team"],
            "interlocked loops",
        ),
        // State: liveness and availability
        glyph(
            "S01",
            "heartbeat",
            "fist pulsing at chest",
            "\u{2661}",
            State,
            &["heartbeat", "alive", "ping", "keepalive"],
            "pulse line",
        ),
        glyph(
            "S02",
            "online",
            "standing tall, arms at sides",
            "\u{25cf}",
            State,
            &["online", "available", "ready", "up"],
            "filled circle",
        ),
        glyph(
            "S03",
            "offline",
            "seated, head bowed",
            "\u{25cb}",
            State,
            &["offline", "away", "down", "unavailable"],
            "hollow circle",
        ),
        glyph(
            "S04",
            "busy",
            "arms crossed over face",
            "\u{29d6}",
            State,
            &["busy", "occupied", "working", "wait"],
            "hourglass",
        ),
        glyph(
            "S05",
            "idle",
            "leaning, one arm dangling",
            "\u{2092}",
            State,
            &["idle", "waiting", "standby", "free"],
            "leaning figure",
        ),
        glyph(
            "S06",
            "sync",
            "arms circling in unison",
            "\u{27f3}",
            State,
            &["sync", "synchronize", "refresh", "update"],
            "circular arrows",
        ),
        glyph(
            "S07",
            "status",
            "hand shading eyes",
            "\u{2139}",
            State,
            &["status", "state", "report", "health"],
            "lookout pose",
        ),
        // Payment: invoicing and settlement
        glyph(
            "P01",
            "invoice",
            "palm up, fingers curling",
            "\u{00a4}",
            Payment,
            &["invoice", "bill", "charge", "request-payment"],
            "open palm with slip",
        ),
        glyph(
            "P02",
            "pay",
            "hand extending coin",
            "\u{25c8}",
            Payment,
            &["pay", "payment", "send-funds", "settle"],
            "coin changing hands",
        ),
        glyph(
            "P03",
            "payment received",
            "both hands closing at chest",
            "\u{2611}",
            Payment,
            &["received-payment", "paid", "settled", "cleared"],
            "coin drawn to chest",
        ),
        glyph(
            "P04",
            "refund",
            "coin returned, palm out",
            "\u{21a9}",
            Payment,
            &["refund", "return", "chargeback", "reverse"],
            "coin arcing back",
        ),
        glyph(
            "P05",
            "escrow",
            "hands cupped over a box",
            "\u{29c9}",
            Payment,
            &["escrow", "hold", "custody", "deposit-hold"],
            "sealed box",
        ),
        glyph(
            "P06",
            "subscribe",
            "repeated tapping gesture",
            "\u{267a}",
            Payment,
            &["subscribe", "subscription", "recurring", "renew"],
            "looping calendar",
        ),
    ]
}
