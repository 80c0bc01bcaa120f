use interpreter::{Auxiliary, BlockType, Category, CommandSet, ErrorKind, Outcome, interpret};
use mcml::{Coordinate, Flag, Header, TagName};

const EMPTY_HEADERS: &str = "<setup></setup>
<teardown></teardown>
<spawning></spawning>
<startup></startup>
<reset></reset>";

fn file(start: (i32, i32, i32), direction: &str, headers: &str, blocks: &str) -> String {
    format!(
        "<start>\n<x>{}</x>\n<y>{}</y>\n<z>{}</z>\n</start>\n<direction>{}</direction>\n{}\n<blocks>\n{}\n</blocks>\n",
        start.0, start.1, start.2, direction, headers, blocks
    )
}

fn section(name: &str, relative: u8, offset: (i32, i32, i32), body: &str) -> String {
    format!(
        "<section>\n<name>{}</name>\n<start>\n<relative>{}</relative>\n<x>{}</x>\n<y>{}</y>\n<z>{}</z>\n</start>\n{}\n</section>",
        name, relative, offset.0, offset.1, offset.2, body
    )
}

fn group_start(relative: u8, offset: (i32, i32, i32)) -> String {
    format!(
        "<start>\n<relative>{}</relative>\n<x>{}</x>\n<y>{}</y>\n<z>{}</z>\n</start>",
        relative, offset.0, offset.1, offset.2
    )
}

fn run(source: &str) -> CommandSet {
    interpret(source, 0).expect("interpretation failed")
}

fn rendered(set: &CommandSet, name: &str) -> Vec<String> {
    set.arrays()
        .into_iter()
        .find(|(array, _)| *array == name)
        .map(|(_, commands)| commands)
        .unwrap()
}

#[test]
fn minimal_file() {
    let blocks = format!("{}\n{}", group_start(0, (0, 0, 0)), section("main", 1, (0, 0, 0), "say hi"));
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));

    assert_eq!(set.commands.len(), 1);
    let block = &set.commands[0];
    assert_eq!(block.block_type, BlockType::Repeating);
    assert_eq!(block.position, Coordinate::ORIGIN);
    assert_eq!(block.data, 5);
    assert_eq!(
        block.to_string(),
        "/setblock 0 0 0 repeating_command_block 5 replace {Command:\"say hi\",auto:0b}"
    );
    assert!(set.headers.iter().all(Vec::is_empty));
    assert!(set.extra.is_empty());
}

#[test]
fn arrays_come_in_delivery_order() {
    let set = run(&file((0, 0, 0), "x", EMPTY_HEADERS, &group_start(0, (0, 0, 0))));
    let names: Vec<&str> = set.arrays().iter().map(|(name, _)| *name).collect();
    assert_eq!(
        names,
        ["setup", "teardown", "spawning", "startup", "reset", "commands", "extra"]
    );
    assert!(set.is_empty());
}

#[test]
fn headers_stack_two_blocks_up() {
    let headers = "<setup>\nsay s1\nsay s2\n</setup>
<teardown></teardown>
<spawning>say sp</spawning>
<startup></startup>
<reset>\n<impulse>\nsay r\n</impulse>\n</reset>";
    let set = run(&file((5, 60, -3), "-z", headers, &group_start(0, (0, 0, 0))));

    let setup = set.header(Header::Setup);
    assert_eq!(setup[0].position, Coordinate::new(5, 60, -3));
    assert_eq!(setup[1].position, Coordinate::new(5, 60, -4));
    assert_eq!(setup[0].block_type, BlockType::Repeating);
    assert_eq!(setup[1].block_type, BlockType::Chain);
    assert_eq!(setup[1].data, 2);

    assert_eq!(set.header(Header::Spawning)[0].position, Coordinate::new(5, 64, -3));
    let reset = set.header(Header::Reset);
    assert_eq!(reset[0].position, Coordinate::new(5, 68, -3));
    assert_eq!(reset[0].block_type, BlockType::Impulse);

    let names: Vec<&str> = set.sections.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["setup", "teardown", "spawning", "startup", "reset"]);
}

#[test]
fn relative_sections_chain_from_previous_anchor() {
    let blocks = [
        group_start(1, (10, 0, 0)),
        section("first", 1, (0, 5, 0), "say a\nsay b"),
        section("second", 1, (2, 0, 3), "say c"),
        section("third", 0, (2, 0, 3), "say d"),
    ]
    .join("\n");
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));

    let anchors: Vec<(&str, Coordinate)> = set.sections[5..]
        .iter()
        .map(|(n, c)| (n.as_str(), *c))
        .collect();
    assert_eq!(
        anchors,
        [
            ("first", Coordinate::new(10, 5, 0)),
            ("second", Coordinate::new(12, 5, 3)),
            ("third", Coordinate::new(2, 0, 3)),
        ]
    );

    let positions: Vec<Coordinate> = set.commands.iter().map(|b| b.position).collect();
    assert_eq!(
        positions,
        [
            Coordinate::new(10, 5, 0),
            Coordinate::new(11, 5, 0),
            Coordinate::new(12, 5, 3),
            Coordinate::new(2, 0, 3),
        ]
    );
    // Every section starts its own chain.
    let types: Vec<BlockType> = set.commands.iter().map(|b| b.block_type).collect();
    assert_eq!(
        types,
        [BlockType::Repeating, BlockType::Chain, BlockType::Repeating, BlockType::Repeating]
    );
}

#[test]
fn relative_group_start_offsets_origin() {
    let blocks = [group_start(1, (1, 1, 1)), section("s", 1, (0, 0, 0), "say x")].join("\n");
    let set = run(&file((100, 64, 100), "z", EMPTY_HEADERS, &blocks));
    assert_eq!(set.commands[0].position, Coordinate::new(101, 65, 101));
    assert_eq!(set.commands[0].data, 3);
}

#[test]
fn references_resolve_and_emit_wiring() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("A", 0, (0, 0, 0), "say in A"),
        section("trigger", 0, (0, 10, 0), "setblock $<A> redstone_block\nsetblock $<A> air"),
    ]
    .join("\n");
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));

    assert_eq!(set.commands[1].command, "setblock -3 0 0 redstone_block");
    assert_eq!(set.commands[2].command, "setblock -5 0 0 air");
    assert_eq!(
        set.extra,
        [
            Auxiliary::Support(Coordinate::new(-3, -1, 0)),
            Auxiliary::Repeater {
                position: Coordinate::new(-3, 0, 0),
                data: 1
            },
            Auxiliary::Support(Coordinate::new(-5, -1, 0)),
            Auxiliary::Repeater {
                position: Coordinate::new(-5, 0, 0),
                data: 1
            },
        ]
    );
    assert_eq!(
        rendered(&set, "extra"),
        [
            "/setblock -3 -1 0 stone 6",
            "/setblock -3 0 0 unpowered_repeater 1",
            "/setblock -5 -1 0 stone 6",
            "/setblock -5 0 0 unpowered_repeater 1",
        ]
    );
    // The registry reports declared anchors, not the walked ones.
    assert_eq!(set.sections.last(), Some(&("trigger".to_string(), Coordinate::new(0, 10, 0))));
}

#[test]
fn headers_are_substituted_before_sections() {
    let headers = "<setup>say $<B></setup>
<teardown></teardown>
<spawning></spawning>
<startup>say $<setup></startup>
<reset></reset>";
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("B", 0, (20, 0, 0), "say $<B>"),
    ]
    .join("\n");
    let set = run(&file((0, 0, 0), "-x", headers, &blocks));

    assert_eq!(set.header(Header::Setup)[0].command, "say 23 0 0");
    assert_eq!(set.header(Header::Startup)[0].command, "say 3 0 0");
    assert_eq!(set.commands[0].command, "say 25 0 0");
    assert_eq!(set.extra.len(), 6);
    assert_eq!(
        set.extra[1],
        Auxiliary::Repeater {
            position: Coordinate::new(23, 0, 0),
            data: 3
        }
    );
}

#[test]
fn quotes_are_escaped_after_substitution() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("A", 0, (0, 0, 0), "<auto>\ntellraw @a {\"text\":\"$<A>\"}\n</auto>"),
    ]
    .join("\n");
    let set = run(&file((0, 0, 0), "+z", EMPTY_HEADERS, &blocks));
    assert_eq!(
        rendered(&set, "commands"),
        ["/setblock 0 0 0 repeating_command_block 3 replace {Command:\"tellraw @a {\\\"text\\\":\\\"0 0 -3\\\"}\",auto:1b}"]
    );
    assert_eq!(rendered(&set, "extra")[1], "/setblock 0 0 -3 unpowered_repeater 2");
}

#[test]
fn comments_are_ignored_everywhere() {
    let source = "# header comment
<start>
// inline comment
<x>1</x>
<y>2</y>

<z>3</z>
</start>
<direction>x</direction>
<setup>
# nothing here
</setup>
<teardown></teardown>
<spawning></spawning>
<startup></startup>
<reset></reset>
<blocks>
<start>
<relative>0</relative>
<x>0</x>
<y>0</y>
<z>0</z>
</start>
# a commented section
<section>
<name>s</name>
<start>
<relative>1</relative>
<x>0</x>
<y>0</y>
<z>0</z>
</start>
// first
say one
</section>
</blocks>
";
    let set = run(source);
    assert_eq!(set.commands.len(), 1);
    assert_eq!(set.commands[0].command, "say one");
    assert_eq!(set.commands[0].source.line, 34);
}

#[test]
fn stray_content_after_sections_ends_the_loop() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("s", 0, (0, 0, 0), "say a"),
        "say stray".to_string(),
        section("never", 0, (0, 0, 0), "say b"),
    ]
    .join("\n");
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));
    assert_eq!(set.commands.len(), 1);
    assert!(set.sections.iter().all(|(name, _)| name != "never"));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn missing_coordinate_tag_is_structural() {
    let source = "<start>\n<x>0</x>\n<z>0</z>\n</start>\n<direction>+x</direction>";
    let err = interpret(source, 3).unwrap_err();
    assert_eq!(err.category(), Category::Structural);
    assert!(matches!(err.kind, ErrorKind::MissingTag { expected: TagName::Y, .. }));
    assert_eq!(err.line(), 3);
    assert_eq!(err.file_id, 3);
}

#[test]
fn failure_does_not_leak_into_the_next_file() {
    let broken = file((0, 0, 0), "+x", EMPTY_HEADERS, "<start>\n<relative>0</relative>\n<x>0</x>\n</start>");
    assert!(interpret(&broken, 0).is_err());

    let blocks = [group_start(0, (0, 0, 0)), section("s", 0, (0, 0, 0), "say ok")].join("\n");
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));
    assert_eq!(set.commands.len(), 1);
    assert_eq!(set.sections.len(), 6);
}

#[test]
fn invalid_direction() {
    let err = interpret(&file((0, 0, 0), "+y", EMPTY_HEADERS, ""), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidDirection("+y".into()));
    assert_eq!(err.line(), 6);
}

#[test]
fn missing_header() {
    let headers = "<setup></setup>\n<spawning></spawning>";
    let err = interpret(&file((0, 0, 0), "+x", headers, ""), 0).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::MissingTag { expected: TagName::Teardown, .. }));
}

#[test]
fn flag_nesting_errors_abort_the_file() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("s", 0, (0, 0, 0), "say a\n</chain>\nsay b"),
    ]
    .join("\n");
    let err = interpret(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::FlagNotOpen(Flag::Chain));
    assert_eq!(err.category(), Category::Semantic);

    let blocks = [
        group_start(0, (0, 0, 0)),
        section("s", 0, (0, 0, 0), "<impulse>\n<impulse>\nsay a"),
    ]
    .join("\n");
    let err = interpret(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::FlagAlreadyOpen(Flag::Impulse));
}

#[test]
fn invalid_relative_value() {
    let blocks = group_start(0, (0, 0, 0)).replace(">0</relative>", ">maybe</relative>");
    let err = interpret(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRelative("maybe".into()));
}

#[test]
fn unresolved_binding_reports_its_line() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("s", 0, (0, 0, 0), "say hi\nsay $<ghost>"),
    ]
    .join("\n");
    let source = file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks);
    let err = interpret(&source, 0).unwrap_err();
    assert_eq!(err.category(), Category::Binding);
    assert_eq!(err.kind, ErrorKind::UnresolvedBinding("ghost".into()));
    assert_eq!(source.lines().nth(err.line() - 1), Some("say $<ghost>"));
}

#[test]
fn unterminated_blocks_tag() {
    let source = file((0, 0, 0), "+x", EMPTY_HEADERS, "").replace("</blocks>", "");
    let err = interpret(&source, 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnterminatedTag(TagName::Blocks));
}

#[test]
fn positive_z_conditional_halts_the_run() {
    let blocks = [
        group_start(0, (0, 0, 0)),
        section("s", 0, (0, 0, 0), "<conditional>\nsay a\n</conditional>"),
    ]
    .join("\n");
    let outcome = Outcome::from(interpret(&file((0, 0, 0), "+z", EMPTY_HEADERS, &blocks), 0));
    assert!(matches!(outcome, Outcome::Halted(ref e) if e.category() == Category::Fatal));

    let outcome = Outcome::from(interpret(&file((0, 0, 0), "-z", EMPTY_HEADERS, &blocks), 0));
    match outcome {
        Outcome::Interpreted(set) => assert_eq!(set.commands[0].data, 10),
        other => panic!("expected success, got {:?}", other),
    }
}

#[test]
fn missing_relative_flag_is_semantic() {
    let unflagged = section("s", 0, (0, 0, 0), "say a").replace("<relative>0</relative>\n", "");
    let blocks = [group_start(0, (0, 0, 0)), unflagged].join("\n");
    let source = file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks);
    let err = interpret(&source, 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingRelative);
    assert_eq!(err.category(), Category::Semantic);
    assert!(matches!(Outcome::from(Err(err)), Outcome::Skipped(_)));
}

#[test]
fn unclosed_flag_is_structural() {
    let blocks = [group_start(0, (0, 0, 0)), section("s", 0, (0, 0, 0), "<chain>\nsay a")].join("\n");
    let source = file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks);
    let err = interpret(&source, 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnclosedFlag(Flag::Chain));
    assert_eq!(err.category(), Category::Structural);
    assert_eq!(source.lines().nth(err.line() - 1), Some("</section>"));
}

#[test]
fn coordinates_at_the_range_edge_skip_the_file() {
    let edge = (i32::MAX, 0, 0);
    let one = [group_start(1, (0, 0, 0)), section("s", 1, (0, 0, 0), "say a")].join("\n");
    let set = run(&file(edge, "+x", EMPTY_HEADERS, &one));
    assert_eq!(set.commands[0].position, Coordinate::new(i32::MAX, 0, 0));

    let two = [group_start(1, (0, 0, 0)), section("s", 1, (0, 0, 0), "say a\nsay b")].join("\n");
    let source = file(edge, "+x", EMPTY_HEADERS, &two);
    let err = interpret(&source, 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::CoordinateOverflow);
    assert_eq!(source.lines().nth(err.line() - 1), Some("say b"));
    assert!(matches!(Outcome::from(Err(err)), Outcome::Skipped(_)));

    let err = interpret(&file((0, i32::MAX - 1, 0), "+x", EMPTY_HEADERS, ""), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::CoordinateOverflow);
    assert_eq!(err.line(), 8);
}

#[test]
fn headers_are_referenced_by_name_only() {
    let blocks = [group_start(0, (0, 0, 0)), section("s", 0, (0, 0, 0), "say $<0>")].join("\n");
    let err = interpret(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks), 0).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnresolvedBinding("0".into()));

    let blocks = [group_start(0, (0, 0, 0)), section("s", 0, (0, 0, 0), "say $<setup>")].join("\n");
    let set = run(&file((0, 0, 0), "+x", EMPTY_HEADERS, &blocks));
    assert_eq!(set.commands[0].command, "say -3 0 0");
}
