//! Static table of builtin functions, built once and looked up by name or alias.

use std::fmt;
use std::sync::OnceLock;

use mothball_core::{format_number, AxisModel, Modifiers, MoveState};

use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    FastMover,
    SlowMover,
    Stopper,
    Returner,
    Calculator,
}

impl Family {
    pub const ALL: [Family; 5] = [
        Family::FastMover,
        Family::SlowMover,
        Family::Stopper,
        Family::Returner,
        Family::Calculator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::FastMover => "fast-movers",
            Family::SlowMover => "slow-movers",
            Family::Stopper => "stoppers",
            Family::Returner => "returners",
            Family::Calculator => "calculators",
        }
    }

    pub fn parse(text: &str) -> Option<Family> {
        match text.to_ascii_lowercase().replace('_', "-").as_str() {
            "fast" | "fast-movers" | "fastmover" | "fast-mover" => Some(Family::FastMover),
            "slow" | "slow-movers" | "slowmover" | "slow-mover" => Some(Family::SlowMover),
            "stop" | "stoppers" | "stopper" => Some(Family::Stopper),
            "out" | "returners" | "returner" => Some(Family::Returner),
            "calc" | "calculators" | "calculator" | "setters" => Some(Family::Calculator),
            _ => None,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axes {
    Horizontal,
    Vertical,
    Both,
}

impl Axes {
    pub fn supports(self, axis: AxisModel) -> bool {
        match self {
            Axes::Both => true,
            Axes::Horizontal => axis == AxisModel::Horizontal,
            Axes::Vertical => axis == AxisModel::Vertical,
        }
    }
}

/// What a `.keys` suffix may contain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputRule {
    /// Any keys; `w` when omitted.
    Free,
    /// Must hold `w` and never `s`; `w` when omitted.
    Sprint,
    /// No suffix accepted.
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamKind {
    PositionalOnly,
    PositionalOrKeyword,
    Variadic,
    KeywordOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Float,
    Bool,
    Text,
    Sequence,
}

impl ParamType {
    pub fn name(self) -> &'static str {
        match self {
            ParamType::Int => "int",
            ParamType::Float => "float",
            ParamType::Bool => "bool",
            ParamType::Text => "text",
            ParamType::Sequence => "sequence",
        }
    }

    pub fn parse(text: &str) -> Option<ParamType> {
        match text.trim().to_ascii_lowercase().as_str() {
            "int" => Some(ParamType::Int),
            "float" => Some(ParamType::Float),
            "bool" => Some(ParamType::Bool),
            "text" | "str" => Some(ParamType::Text),
            "sequence" | "seq" => Some(ParamType::Sequence),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
    pub ty: ParamType,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: &str, kind: ParamKind, ty: ParamType, default: Option<Value>) -> Self {
        Self {
            name: name.to_string(),
            kind,
            ty,
            default,
        }
    }

    fn render(&self) -> String {
        let mut out = match self.kind {
            ParamKind::Variadic => format!("*{}: {}", self.name, self.ty.name()),
            _ => format!("{}: {}", self.name, self.ty.name()),
        };
        if let Some(default) = &self.default {
            let shown = match default {
                Value::Float(v) => format_number(*v, 6),
                other => other.to_string(),
            };
            out.push_str(&format!(" = {shown}"));
        }
        out
    }
}

fn required(name: &str, ty: ParamType) -> Param {
    Param::new(name, ParamKind::PositionalOrKeyword, ty, None)
}

fn optional(name: &str, ty: ParamType, default: Value) -> Param {
    Param::new(name, ParamKind::PositionalOrKeyword, ty, Some(default))
}

fn keyword(name: &str, ty: ParamType, default: Value) -> Param {
    Param::new(name, ParamKind::KeywordOnly, ty, Some(default))
}

fn positional(name: &str, ty: ParamType) -> Param {
    Param::new(name, ParamKind::PositionalOnly, ty, None)
}

fn variadic(name: &str, ty: ParamType) -> Param {
    Param::new(name, ParamKind::Variadic, ty, None)
}

/// `name(a: int, /, b: float = 1, *rest: text, c: bool = true)`.
pub fn format_signature(name: &str, params: &[Param]) -> String {
    let mut parts = Vec::new();
    let mut saw_positional_only = false;
    let mut saw_star = false;
    for (index, param) in params.iter().enumerate() {
        match param.kind {
            ParamKind::PositionalOnly => saw_positional_only = true,
            ParamKind::Variadic => saw_star = true,
            ParamKind::KeywordOnly if !saw_star => {
                parts.push("*".to_string());
                saw_star = true;
            }
            _ => {}
        }
        parts.push(param.render());
        let next_is_positional_only = params
            .get(index + 1)
            .is_some_and(|next| next.kind == ParamKind::PositionalOnly);
        if saw_positional_only && param.kind == ParamKind::PositionalOnly && !next_is_positional_only {
            parts.push("/".to_string());
        }
    }
    format!("{name}({})", parts.join(", "))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Coord {
    X,
    Z,
    Y,
}

impl Coord {
    pub fn name(self) -> &'static str {
        match self {
            Coord::X => "x",
            Coord::Z => "z",
            Coord::Y => "y",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Readout {
    Pos(Coord),
    Vel(Coord),
    Angle,
}

/// How a horizontal mover drives each tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gait {
    /// `Jump` runs one jump tick followed by air ticks.
    pub phase: MoveState,
    pub sprint: bool,
    pub sneak: bool,
    pub strafe45: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Move(Gait),
    Rise(MoveState),
    Out(Readout),
    OutMm(Coord),
    OutBlocks(Coord),
    OutVec,
    Print,
    Help,
    Facing,
    Turn,
    Angles,
    Turns,
    SetPos(Coord),
    SetVel(Coord),
    Slip,
    Speed,
    Slowness,
    JumpBoost,
    Ceiling,
    Inertia,
    Precision,
    Inv(Coord),
    Bwmm(Coord),
    Possibility(Option<Coord>),
    InertiaListener,
    Var,
    Def,
    Repeat,
}

#[derive(Clone, Debug)]
pub struct BuiltinDef {
    pub op: Op,
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    pub family: Family,
    pub axes: Axes,
    pub params: Vec<Param>,
    pub input: InputRule,
    pub modifiers: Modifiers,
    pub reversible: bool,
    /// Skipped when `repeat` replays its collected calls.
    pub once: bool,
    pub doc: &'static str,
}

impl BuiltinDef {
    fn new(
        op: Op,
        name: &'static str,
        aliases: &'static [&'static str],
        family: Family,
        axes: Axes,
        params: Vec<Param>,
    ) -> Self {
        Self {
            op,
            name,
            aliases,
            family,
            axes,
            params,
            input: InputRule::None,
            modifiers: Modifiers::NONE,
            reversible: false,
            once: false,
            doc: "",
        }
    }

    fn input(mut self, rule: InputRule) -> Self {
        self.input = rule;
        self
    }

    fn movable(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self.reversible = true;
        self
    }

    fn once(mut self) -> Self {
        self.once = true;
        self
    }

    fn doc(mut self, doc: &'static str) -> Self {
        self.doc = doc;
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.name == name || self.aliases.contains(&name)
    }

    pub fn signature(&self) -> String {
        format_signature(self.name, &self.params)
    }

    /// Signature, aliases and description, as `help` prints them.
    pub fn describe(&self) -> String {
        let mut out = self.signature();
        if !self.aliases.is_empty() {
            out.push_str(&format!("\n  aliases: {}", self.aliases.join(", ")));
        }
        if !self.doc.is_empty() {
            out.push_str(&format!("\n  {}", self.doc));
        }
        out
    }
}

fn horizontal_mover(
    name: &'static str,
    aliases: &'static [&'static str],
    family: Family,
    gait: Gait,
    input: InputRule,
    doc: &'static str,
) -> BuiltinDef {
    let params = vec![
        optional("duration", ParamType::Int, Value::Int(1)),
        optional("rotation", ParamType::Float, Value::None),
        keyword("slip", ParamType::Float, Value::None),
    ];
    BuiltinDef::new(Op::Move(gait), name, aliases, family, Axes::Horizontal, params)
        .input(input)
        .movable(Modifiers::ALL)
        .doc(doc)
}

fn vertical_mover(
    name: &'static str,
    aliases: &'static [&'static str],
    family: Family,
    phase: MoveState,
    doc: &'static str,
) -> BuiltinDef {
    let params = vec![optional("duration", ParamType::Int, Value::Int(1))];
    BuiltinDef::new(Op::Rise(phase), name, aliases, family, Axes::Vertical, params)
        .movable(Modifiers::FLUIDS)
        .doc(doc)
}

fn returner(
    op: Op,
    name: &'static str,
    aliases: &'static [&'static str],
    axes: Axes,
    doc: &'static str,
) -> BuiltinDef {
    let params = vec![
        optional("center", ParamType::Float, Value::None),
        optional("label", ParamType::Text, Value::Text(name.to_string())),
    ];
    BuiltinDef::new(op, name, aliases, Family::Returner, axes, params).doc(doc)
}

fn setter(
    op: Op,
    name: &'static str,
    aliases: &'static [&'static str],
    axes: Axes,
    params: Vec<Param>,
    doc: &'static str,
) -> BuiltinDef {
    BuiltinDef::new(op, name, aliases, Family::Calculator, axes, params).doc(doc)
}

const fn gait(phase: MoveState, sprint: bool, sneak: bool, strafe45: bool) -> Gait {
    Gait {
        phase,
        sprint,
        sneak,
        strafe45,
    }
}

fn build_catalogue() -> Vec<BuiltinDef> {
    use Family::*;
    use MoveState::{Air, Ground, Jump, Slime};
    use ParamType::{Bool, Float, Int, Sequence, Text};

    let mut out = vec![
        horizontal_mover("sprint", &["s"], FastMover, gait(Ground, true, false, false), InputRule::Sprint, "Sprint on the ground."),
        horizontal_mover("sprintjump", &["sj"], FastMover, gait(Jump, true, false, false), InputRule::Sprint, "Sprint jump, then sprint in the air."),
        horizontal_mover("sprintair", &["sa"], FastMover, gait(Air, true, false, false), InputRule::Sprint, "Sprint in the air."),
        horizontal_mover("sprint45", &["s45"], FastMover, gait(Ground, true, false, true), InputRule::None, "Sprint with the 45 degree strafe."),
        horizontal_mover("sprintjump45", &["sj45"], FastMover, gait(Jump, true, false, true), InputRule::None, "Sprint jump with the 45 degree strafe."),
        horizontal_mover("sprintair45", &["sa45"], FastMover, gait(Air, true, false, true), InputRule::None, "Sprint in the air with the 45 degree strafe."),
        horizontal_mover("sneaksprint", &["sns"], FastMover, gait(Ground, true, true, false), InputRule::Sprint, "Sneak while sprinting on the ground."),
        horizontal_mover("sneaksprintjump", &["snsj"], FastMover, gait(Jump, true, true, false), InputRule::Sprint, "Sneak sprint jump."),
        horizontal_mover("sneaksprintair", &["snsa"], FastMover, gait(Air, true, true, false), InputRule::Sprint, "Sneak sprint in the air."),
        vertical_mover("jump", &["j"], FastMover, Jump, "Jump, then fall through the air."),
        horizontal_mover("walk", &["w"], SlowMover, gait(Ground, false, false, false), InputRule::Free, "Walk on the ground."),
        horizontal_mover("walkjump", &["wj"], SlowMover, gait(Jump, false, false, false), InputRule::Free, "Walk jump, then walk in the air."),
        horizontal_mover("walkair", &["wa"], SlowMover, gait(Air, false, false, false), InputRule::Free, "Walk in the air."),
        horizontal_mover("walk45", &["w45"], SlowMover, gait(Ground, false, false, true), InputRule::None, "Walk with the 45 degree strafe."),
        horizontal_mover("walkjump45", &["wj45"], SlowMover, gait(Jump, false, false, true), InputRule::None, "Walk jump with the 45 degree strafe."),
        horizontal_mover("walkair45", &["wa45"], SlowMover, gait(Air, false, false, true), InputRule::None, "Walk in the air with the 45 degree strafe."),
        horizontal_mover("sneak", &["sn"], SlowMover, gait(Ground, false, true, false), InputRule::Free, "Sneak on the ground."),
        horizontal_mover("sneakjump", &["snj"], SlowMover, gait(Jump, false, true, false), InputRule::Free, "Sneak jump."),
        horizontal_mover("sneakair", &["sna"], SlowMover, gait(Air, false, true, false), InputRule::Free, "Sneak in the air."),
        horizontal_mover("sneak45", &["sn45"], SlowMover, gait(Ground, false, true, true), InputRule::None, "Sneak with the 45 degree strafe."),
        vertical_mover("air", &["a"], SlowMover, Air, "Fall through the air."),
        vertical_mover("slime", &["bounce"], SlowMover, Slime, "Bounce off slime, then fall through the air."),
        horizontal_mover("stop", &["st"], Stopper, gait(Ground, false, false, false), InputRule::None, "Stand still on the ground."),
        horizontal_mover("stopjump", &["stj"], Stopper, gait(Jump, false, false, false), InputRule::None, "Jump without input."),
        horizontal_mover("stopair", &["sta"], Stopper, gait(Air, false, false, false), InputRule::None, "Drift through the air without input."),
        vertical_mover("ground", &["g"], Stopper, Ground, "Stand on the ground."),
    ];

    out.extend([
        returner(Op::Out(Readout::Pos(Coord::X)), "outx", &[], Axes::Horizontal, "Print the x position."),
        returner(Op::Out(Readout::Pos(Coord::Z)), "outz", &[], Axes::Horizontal, "Print the z position."),
        returner(Op::Out(Readout::Vel(Coord::X)), "outvx", &[], Axes::Horizontal, "Print the x velocity."),
        returner(Op::Out(Readout::Vel(Coord::Z)), "outvz", &[], Axes::Horizontal, "Print the z velocity."),
        returner(Op::Out(Readout::Angle), "outangle", &["outa", "outfacing"], Axes::Horizontal, "Print the default facing."),
        returner(Op::OutMm(Coord::X), "outxmm", &["xmm"], Axes::Horizontal, "Print the x distance in momentum terms (0.6 removed)."),
        returner(Op::OutMm(Coord::Z), "outzmm", &["zmm"], Axes::Horizontal, "Print the z distance in momentum terms (0.6 removed)."),
        returner(Op::OutBlocks(Coord::X), "outxb", &["xb"], Axes::Horizontal, "Print the x distance in blocks (0.6 added)."),
        returner(Op::OutBlocks(Coord::Z), "outzb", &["zb"], Axes::Horizontal, "Print the z distance in blocks (0.6 added)."),
        returner(Op::OutVec, "outvec", &["vec"], Axes::Horizontal, "Print the speed and direction of the velocity."),
        returner(Op::Out(Readout::Pos(Coord::Y)), "outy", &[], Axes::Vertical, "Print the y position."),
        returner(Op::Out(Readout::Vel(Coord::Y)), "outvy", &[], Axes::Vertical, "Print the y velocity."),
        BuiltinDef::new(Op::Print, "print", &[], Returner, Axes::Both, vec![variadic("text", Text)])
            .doc("Print text; {expr} is replaced by its value."),
        BuiltinDef::new(Op::Help, "help", &[], Returner, Axes::Both, vec![optional("name", Text, Value::None)])
            .doc("Describe a function, or list every function."),
    ]);

    out.extend([
        setter(Op::Facing, "facing", &["face", "f"], Axes::Horizontal, vec![required("angle", Float)], "Set the default facing."),
        setter(Op::Turn, "turn", &["t"], Axes::Horizontal, vec![required("angle", Float)], "Rotate the default facing."),
        setter(Op::Angles, "angles", &["rotations"], Axes::Horizontal, vec![variadic("angles", Float)], "Queue one absolute facing per upcoming tick."),
        setter(Op::Turns, "turns", &[], Axes::Horizontal, vec![variadic("deltas", Float)], "Queue one facing change per upcoming tick."),
        setter(Op::SetPos(Coord::X), "setposx", &["x", "posx"], Axes::Horizontal, vec![required("x", Float)], "Set the x position."),
        setter(Op::SetPos(Coord::Z), "setposz", &["z", "posz"], Axes::Horizontal, vec![required("z", Float)], "Set the z position."),
        setter(Op::SetVel(Coord::X), "setvx", &["vx"], Axes::Horizontal, vec![required("vx", Float)], "Set the x velocity."),
        setter(Op::SetVel(Coord::Z), "setvz", &["vz"], Axes::Horizontal, vec![required("vz", Float)], "Set the z velocity."),
        setter(Op::Slip, "slip", &[], Axes::Horizontal, vec![required("slip", Float)], "Set the ground slipperiness."),
        setter(Op::Speed, "speed", &[], Axes::Horizontal, vec![required("level", Int)], "Set the speed potion level."),
        setter(Op::Slowness, "slowness", &["slow"], Axes::Horizontal, vec![required("level", Int)], "Set the slowness potion level."),
        setter(Op::Inv(Coord::Z), "zinv", &["inv"], Axes::Horizontal, vec![required("goal", Float), required("sequence", Sequence)], "Solve the initial z velocity that travels exactly goal."),
        setter(Op::Inv(Coord::X), "xinv", &[], Axes::Horizontal, vec![required("goal", Float), required("sequence", Sequence)], "Solve the initial x velocity that travels exactly goal."),
        setter(Op::Bwmm(Coord::Z), "zbwmm", &["bwmm"], Axes::Horizontal, vec![required("mm", Float), required("sequence", Sequence)], "Solve the initial z velocity for a backwards momentum of mm."),
        setter(Op::Bwmm(Coord::X), "xbwmm", &[], Axes::Horizontal, vec![required("mm", Float), required("sequence", Sequence)], "Solve the initial x velocity for a backwards momentum of mm."),
        possibility(Op::Possibility(None), "possibility", &["poss"]),
        possibility(Op::Possibility(Some(Coord::X)), "xpossibility", &["xposs"]),
        possibility(Op::Possibility(Some(Coord::Z)), "zpossibility", &["zposs"]),
        setter(Op::SetPos(Coord::Y), "setposy", &["y", "posy"], Axes::Vertical, vec![required("y", Float)], "Set the y position."),
        setter(Op::SetVel(Coord::Y), "setvy", &["vy"], Axes::Vertical, vec![required("vy", Float)], "Set the y velocity."),
        setter(Op::Ceiling, "ceiling", &["ceil"], Axes::Vertical, vec![optional("height", Float, Value::None)], "Set or clear the ceiling height."),
        setter(Op::JumpBoost, "jumpboost", &[], Axes::Vertical, vec![required("level", Int)], "Set the jump boost level."),
        setter(Op::Inertia, "inertia", &[], Axes::Both, vec![required("threshold", Float), optional("single_axis", Bool, Value::Bool(true))], "Set the inertia threshold; single_axis = false checks the combined speed."),
        setter(Op::Precision, "precision", &["pre"], Axes::Both, vec![required("digits", Int)], "Set the number of printed decimals."),
        setter(Op::Var, "var", &["v"], Axes::Both, vec![positional("name", Text), positional("value", Text)], "Assign the value of an expression to a variable.").once(),
        setter(Op::Def, "def", &["function"], Axes::Both, vec![positional("signature", Text), positional("body", Sequence)], "Define a function: def(name(a, b: int = 1), body).").once(),
        setter(Op::Repeat, "repeat", &["r"], Axes::Both, vec![positional("sequence", Sequence), optional("count", Int, Value::Int(1))], "Run a sequence count times."),
        setter(Op::InertiaListener, "inertialistener", &["il"], Axes::Both, vec![
            required("sequence", Sequence),
            optional("miss", Float, Value::Float(0.0)),
            optional("label", Text, Value::Text("inertialistener".to_string())),
        ], "Report ticks where inertia zeroes the velocity, or misses by at most miss."),
    ]);
    out
}

fn possibility(op: Op, name: &'static str, aliases: &'static [&'static str]) -> BuiltinDef {
    use ParamType::{Float, Sequence, Text};
    setter(
        op,
        name,
        aliases,
        Axes::Horizontal,
        vec![
            required("sequence", Sequence),
            optional("mindistance", Float, Value::Float(0.01)),
            optional("offset", Float, Value::Float(0.0)),
            optional("increment", Float, Value::Float(0.0625)),
            optional("miss", Float, Value::Float(0.0)),
            optional("label", Text, Value::Text(name.to_string())),
        ],
        "Report ticks whose position lands within mindistance past a multiple of increment.",
    )
}

pub fn catalogue() -> &'static [BuiltinDef] {
    static CATALOGUE: OnceLock<Vec<BuiltinDef>> = OnceLock::new();
    CATALOGUE.get_or_init(build_catalogue)
}

/// Builtin available under `axis` named `name` (case-insensitive).
pub fn lookup(name: &str, axis: AxisModel) -> Option<&'static BuiltinDef> {
    let name = name.to_ascii_lowercase();
    catalogue()
        .iter()
        .find(|def| def.axes.supports(axis) && def.matches(&name))
}

/// Builtin named `name` under either axis model.
pub fn lookup_any(name: &str) -> Option<&'static BuiltinDef> {
    let name = name.to_ascii_lowercase();
    catalogue().iter().find(|def| def.matches(&name))
}

pub fn family_members(family: Family, axis: AxisModel) -> Vec<&'static BuiltinDef> {
    catalogue()
        .iter()
        .filter(|def| def.family == family && def.axes.supports(axis))
        .collect()
}

/// Every canonical name and alias available under `axis`.
pub fn builtin_names(axis: AxisModel) -> Vec<&'static str> {
    catalogue()
        .iter()
        .filter(|def| def.axes.supports(axis))
        .flat_map(|def| std::iter::once(def.name).chain(def.aliases.iter().copied()))
        .collect()
}
