use glkern::glsl::print_type;
use glkern::glsl::texture::{denormalize, match_normalized, normalize, vector_suffix};
use glkern::glsl::inject_texture_loads;
use glkern::ir::{Argument, BinOp, CallType, Expr, ForType, LoopAxis, Stmt, Type};
use glkern::{compile_module, CodegenOptions, GlslBackend, KernelModule};

fn int(name: &str) -> Expr {
    Expr::var(Type::int(32), name)
}

fn pixel(channel: i32) -> Vec<Expr> {
    vec![int("x"), int("y"), Expr::int(channel)]
}

/// Wrap `body` in the two block-grid loops of a 256x256 launch.
fn over_pixels(body: Stmt) -> Stmt {
    Stmt::block_loop(
        "x",
        LoopAxis::BlockX,
        Expr::int(0),
        Expr::int(256),
        Stmt::block_loop("y", LoopAxis::BlockY, Expr::int(0), Expr::int(256), body),
    )
}

fn brighten_args() -> Vec<Argument> {
    vec![
        Argument::input("src", Type::uint(8)),
        Argument::output("dst", Type::uint(8)),
        Argument::scalar("gain", Type::float(32)),
    ]
}

/// dst = uint8(min(float(src) / 255 * gain, 1) * 255)
fn brighten() -> Stmt {
    let sample = Expr::cast(Type::float(32), Expr::load(Type::uint(8), "src", pixel(0)));
    let scaled = Expr::mul(
        Expr::div(sample, Expr::float(255.0)),
        Expr::var(Type::float(32), "gain"),
    );
    let clamped = Expr::min(scaled, Expr::float(1.0));
    let value = Expr::cast(Type::uint(8), Expr::mul(clamped, Expr::float(255.0)));
    over_pixels(Stmt::store("dst", value, pixel(0)))
}

#[test]
fn test_brighten_module() {
    let mut backend = GlslBackend::default();
    backend.add_kernel(&brighten(), "brighten", &brighten_args()).unwrap();
    insta::assert_snapshot!(backend.source(), @r"
#version 120
/// KERNEL brighten
/// IN_BUFFER uint8 src
/// OUT_BUFFER uint8 dst
/// VAR float gain
uniform sampler2D src;
uniform float gain;
varying vec2 pixcoord;
void main() {
  int x = int(pixcoord.x);
  int y = int(pixcoord.y);
  float _0 = texture2D(src, vec2(x, y)).r;
  float _1 = _0 * 255.00000;
  float _2 = _1 / 255.00000;
  float _3 = _2 * gain;
  float _4 = min(_3, 1.0000000);
  gl_FragColor.r = _4;
}
");
}

#[test]
fn test_module_layout_order() {
    let mut backend = GlslBackend::default();
    backend.add_kernel(&brighten(), "brighten", &brighten_args()).unwrap();
    let src = backend.source();

    let expected_in_order = [
        "#version 120\n",
        "/// KERNEL brighten\n",
        "/// IN_BUFFER uint8 src\n",
        "/// OUT_BUFFER uint8 dst\n",
        "/// VAR float gain\n",
        "uniform sampler2D src;\n",
        "uniform float gain;\n",
        "varying vec2 pixcoord;\n",
        "void main() {\n",
    ];
    let mut pos = 0;
    for needle in expected_in_order {
        let found = src[pos..]
            .find(needle)
            .unwrap_or_else(|| panic!("missing {:?} after byte {}", needle, pos));
        pos += found + needle.len();
    }
    assert!(src.ends_with("}\n"));
    assert_eq!(src.matches("/// IN_BUFFER").count(), 1);
    assert_eq!(src.matches("/// OUT_BUFFER").count(), 1);
    // The output buffer is written through gl_FragColor, never sampled.
    assert!(!src.contains("uniform sampler2D dst"));

    for raw in ["src[", "dst[", "glsl_texture_load", "for ("] {
        assert!(!src.contains(raw), "unexpected {:?} in\n{}", raw, src);
    }
}

#[test]
fn test_null_terminated_bytes() {
    let mut backend = GlslBackend::default();
    backend.add_kernel(&brighten(), "brighten", &brighten_args()).unwrap();
    let bytes = backend.compile_to_src();
    assert_eq!(bytes.last(), Some(&0));
    assert_eq!(bytes.iter().filter(|b| **b == 0).count(), 1);
    assert_eq!(
        std::str::from_utf8(&bytes[..bytes.len() - 1]).unwrap(),
        backend.source()
    );
}

#[test]
fn test_injection_of_float_cast_load() {
    for (ty, max) in [(Type::uint(8), 255.0f32), (Type::uint(16), 65535.0f32)] {
        let body = Stmt::Evaluate(Expr::cast(
            Type::float(32),
            Expr::load(ty, "buf", pixel(1)),
        ));
        let mut args = vec![Expr::string("buf")];
        args.extend(pixel(1));
        let sample = Expr::call(Type::float(32), "glsl_texture_load", args, CallType::Intrinsic);
        assert_eq!(
            inject_texture_loads(&body).unwrap(),
            Stmt::Evaluate(Expr::mul(sample, Expr::float(max)))
        );
    }
}

#[test]
fn test_normalization_round_trip() {
    let shapes = [
        Expr::var(Type::float(32), "v"),
        Expr::add(Expr::var(Type::float(32), "a"), Expr::float(0.5)),
        Expr::select(
            Expr::binary(BinOp::Lt, int("x"), Expr::int(3)),
            Expr::float(0.25),
            Expr::float(0.75),
        ),
    ];
    for x in shapes {
        for ty in [Type::uint(8), Type::uint(16)] {
            let n = normalize(x.clone(), ty).unwrap();
            assert_eq!(match_normalized(&n).unwrap(), Some(x.clone()));
            let d = denormalize(x.clone(), ty).unwrap();
            assert_eq!(match_normalized(&Expr::cast(ty, d)).unwrap(), Some(x.clone()));
        }
    }
}

#[test]
fn test_channel_suffixes() {
    assert_eq!(vector_suffix(&Expr::int(0)).unwrap(), ".r");
    assert_eq!(vector_suffix(&Expr::int(1)).unwrap(), ".g");
    assert_eq!(vector_suffix(&Expr::int(2)).unwrap(), ".b");
    assert_eq!(vector_suffix(&Expr::int(3)).unwrap(), ".a");
    assert_eq!(
        vector_suffix(&Expr::ramp(int("c"), Expr::int(1), 4)).unwrap(),
        ""
    );
    assert!(vector_suffix(&Expr::int(4)).unwrap_err().is_internal());
    assert!(vector_suffix(&Expr::int(-1)).unwrap_err().is_internal());
}

#[test]
fn test_type_printing() {
    assert_eq!(print_type(Type::uint(8)).unwrap(), "int");
    assert_eq!(print_type(Type::float(32)).unwrap(), "float");
    assert_eq!(print_type(Type::float(32).with_width(4)).unwrap(), "vec4");
    assert_eq!(print_type(Type::int(32).with_width(3)).unwrap(), "ivec3");
    assert!(!print_type(Type::float(64)).unwrap_err().is_internal());
    assert!(!print_type(Type::int(32).with_width(5)).unwrap_err().is_internal());
}

#[test]
fn test_read_write_buffer_rejected_before_output() {
    for (read, write) in [(true, true), (false, false)] {
        let mut backend = GlslBackend::default();
        let args = [Argument::buffer("b", Type::uint(8), read, write)];
        let err = backend.add_kernel(&brighten(), "k", &args).unwrap_err();
        assert!(!err.is_internal());
        assert_eq!(backend.source(), "");
    }
}

#[test]
fn test_parallel_loop_emits_nothing() {
    let mut backend = GlslBackend::default();
    backend.add_kernel(&brighten(), "first", &brighten_args()).unwrap();
    let before = backend.source().to_string();

    let body = over_pixels(Stmt::for_loop(
        "c",
        Expr::int(0),
        Expr::int(4),
        ForType::Parallel,
        Stmt::store("dst", Expr::var(Type::uint(8), "v"), pixel(0)),
    ));
    let err = backend.add_kernel(&body, "second", &brighten_args()).unwrap_err();
    assert!(!err.is_internal());
    assert!(err.to_string().contains("Parallel loops"));
    assert_eq!(backend.source(), before);
}

#[test]
fn test_two_kernels_accumulate_and_reset_clears() {
    let mut backend = GlslBackend::default();
    backend.add_kernel(&brighten(), "one", &brighten_args()).unwrap();
    backend.add_kernel(&brighten(), "two", &brighten_args()).unwrap();
    let src = backend.source();
    let one = src.find("/// KERNEL one").unwrap();
    let two = src.find("/// KERNEL two").unwrap();
    assert!(one < two);
    assert_eq!(src.matches("void main() {").count(), 2);

    backend.init_module();
    backend.add_kernel(&brighten(), "three", &brighten_args()).unwrap();
    let src = backend.source();
    assert!(!src.contains("KERNEL one"));
    assert!(!src.contains("KERNEL two"));
    assert!(src.starts_with("#version 120\n/// KERNEL three\n"));
}

#[test]
fn test_serial_channel_loop() {
    let body = over_pixels(Stmt::for_loop(
        "c",
        Expr::int(0),
        Expr::int(3),
        ForType::Serial,
        Stmt::Evaluate(Expr::cast(Type::float(32), int("c"))),
    ));
    let mut backend = GlslBackend::default();
    backend.add_kernel(&body, "k", &[]).unwrap();
    let expected = "  for (int c = 0; c < 0 + 3; c++)\n  {\n    float _0 = float(c);\n  } // for c\n";
    assert!(backend.source().contains(expected));
}

#[test]
fn test_module_from_json_file() {
    let module = KernelModule {
        kernels: vec![glkern::KernelDef {
            name: "brighten".into(),
            args: brighten_args(),
            body: brighten(),
        }],
    };
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("brighten.json");
    std::fs::write(&path, module.to_json().unwrap()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let loaded = KernelModule::parse(&text).unwrap();
    let backend = compile_module(&loaded, &CodegenOptions::default()).unwrap();
    assert!(backend.source().contains("gl_FragColor.r = _4;"));
    assert_eq!(backend.current_kernel_name(), "brighten");
}
