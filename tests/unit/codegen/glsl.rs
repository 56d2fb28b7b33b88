use super::*;
use crate::formula::compile;

fn glsl(src: &str, n: usize) -> String {
    emit(&compile(src, n).unwrap(), &GlslOptions::default()).unwrap()
}

#[test]
fn images_use_sample_template() {
    assert_eq!(glsl("I0", 1), "texture(u_image0, texcoord)");
    let opts = GlslOptions {
        sample_template: "s{}".to_owned(),
        ..GlslOptions::default()
    };
    assert_eq!(emit(&compile("I2", 3).unwrap(), &opts).unwrap(), "s2");
}

#[test]
fn numbers_are_float_literals() {
    assert_eq!(glsl("1", 0), "vec4(1.0)");
    assert_eq!(glsl("0.5", 0), "vec4(0.5)");
}

#[test]
fn arithmetic_is_parenthesized() {
    assert_eq!(
        glsl("I0 + I1 * 2", 2),
        "(texture(u_image0, texcoord) + (texture(u_image1, texcoord) * vec4(2.0)))"
    );
    assert_eq!(glsl("2 ^ 3", 0), "pow(vec4(2.0), vec4(3.0))");
    assert_eq!(glsl("-I0", 1), "(-texture(u_image0, texcoord))");
}

#[test]
fn comparisons_become_vector_relations() {
    assert_eq!(glsl("1 < 2", 0), "vec4(lessThan(vec4(1.0), vec4(2.0)))");
    assert_eq!(glsl("1 != 2", 0), "vec4(notEqual(vec4(1.0), vec4(2.0)))");
}

#[test]
fn functions_map_to_glsl_names() {
    assert_eq!(glsl("abs(1)", 0), "abs(vec4(1.0))");
    assert_eq!(glsl("atan2(1, 2)", 0), "atan(vec4(1.0), vec4(2.0))");
    assert_eq!(
        glsl("blend(I0, I1)", 2),
        "tf_blend(texture(u_image0, texcoord), texture(u_image1, texcoord))"
    );
    assert_eq!(
        glsl("clamp(1, 0, 1)", 0),
        "clamp(vec4(1.0), vec4(0.0), vec4(1.0))"
    );
    assert_eq!(glsl("red(I0)", 1), "vec4(texture(u_image0, texcoord).r)");
    assert!(glsl("luminance(I0)", 1).starts_with("vec4(dot((texture(u_image0, texcoord)).rgb"));
}

#[test]
fn unknown_function_in_deserialized_tree_fails() {
    let e = Expr::BinaryFunction {
        name: "nope".to_owned(),
        left: Box::new(Expr::number(1.0)),
        right: Box::new(Expr::number(2.0)),
    };
    assert_eq!(
        emit(&e, &GlslOptions::default()).unwrap_err(),
        CodegenError::UnknownFunction {
            name: "nope".to_owned(),
            argc: 2,
        }
    );
}

#[test]
fn fragment_shader_declares_samplers_and_helpers() {
    let color = compile("I0", 2).unwrap();
    let alpha = compile("I1", 2).unwrap();
    let src = fragment_shader(&color, &alpha, 2, &GlslOptions::default()).unwrap();
    assert!(src.starts_with("#version 330 core"));
    assert!(src.contains("uniform sampler2D u_image0;"));
    assert!(src.contains("uniform sampler2D u_image1;"));
    assert!(src.contains("vec4 tf_blend("));
    assert!(src.contains("fragColor = vec4(color.rgb, alpha.a);"));
}
