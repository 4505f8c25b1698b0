// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// JNI entry points for the Android host.
//
// The host Activity forwards every WebView callback to the static natives of
// `dev.webshell.NativeShell`. All of them arrive on the UI thread except
// `nativeShouldIntercept`, which WebView calls on a background thread while a
// download may be decoding on the UI thread:
//
//   nativeInit(Activity, String configJson)
//   nativeStartUrl() -> String
//   nativeOnDownloadStart(String, String, String, String, long)
//   nativeShouldIntercept(String url, boolean isMainFrame) -> WebResourceResponse
//   nativeShouldOverrideUrlLoading(String url) -> boolean
//   nativeOnReceivedError(String description, String failingUrl)
//   nativeOnConsoleMessage(int level, String message, String sourceId, int line)
//   nativeOnBackPressed(boolean canGoBack) -> boolean

#![cfg(target_os = "android")]

use std::sync::{Mutex, RwLock};

use jni::JNIEnv;
use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{JNI_FALSE, JNI_TRUE, jboolean, jint, jlong, jobject, jstring};
use tracing::{error, info, warn};
use webshell_core::config::ShellConfig;
use webshell_core::types::{AssetResponse, BackAction, ConsoleLevel};

use crate::services::shell::Shell;

/// The live shell. Replaced on every `nativeInit` so a recreated Activity
/// picks up its own configuration. Callbacks only take the read lock, so
/// asset interception is never blocked behind a running download.
static SHELL: RwLock<Option<Shell>> = RwLock::new(None);

/// Global reference backing the context registered with `ndk_context`.
static ACTIVITY: Mutex<Option<GlobalRef>> = Mutex::new(None);

fn with_shell<T>(fallback: T, f: impl FnOnce(&Shell) -> T) -> T {
    let guard = SHELL.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    match guard.as_ref() {
        Some(shell) => f(shell),
        None => {
            warn!("native callback before nativeInit, ignored");
            fallback
        }
    }
}

fn read_string(env: &mut JNIEnv<'_>, value: &JString<'_>) -> String {
    if value.is_null() {
        return String::new();
    }
    match env.get_string(value) {
        Ok(s) => s.into(),
        Err(e) => {
            warn!(error = %e, "could not read Java string");
            String::new()
        }
    }
}

fn as_jboolean(value: bool) -> jboolean {
    if value { JNI_TRUE } else { JNI_FALSE }
}

/// Point `ndk_context` at `activity` so the platform bridge can reach it.
fn register_activity(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> jni::errors::Result<()> {
    let global = env.new_global_ref(activity)?;
    let vm = env.get_java_vm()?;

    let mut slot = ACTIVITY.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    // SAFETY: the VM pointer is valid for the whole process and `global` is
    // kept alive in `ACTIVITY` until the next registration replaces it.
    unsafe {
        if slot.is_some() {
            ndk_context::release_android_context();
        }
        ndk_context::initialize_android_context(
            vm.get_java_vm_pointer().cast(),
            global.as_obj().as_raw().cast(),
        );
    }
    *slot = Some(global);
    Ok(())
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeInit(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    activity: JObject<'_>,
    config_json: JString<'_>,
) -> jboolean {
    let _ = tracing_subscriber::fmt().with_ansi(false).try_init();

    if let Err(e) = register_activity(&mut env, &activity) {
        error!(error = %e, "could not register the host activity");
        return JNI_FALSE;
    }

    let json = read_string(&mut env, &config_json);
    let config = if json.trim().is_empty() {
        ShellConfig::default()
    } else {
        match ShellConfig::from_json(&json) {
            Ok(config) => config,
            Err(e) => {
                warn!(error = %e, "configuration unusable, using defaults");
                ShellConfig::default()
            }
        }
    };

    match Shell::new(config, webshell_bridge::platform_bridge()) {
        Ok(shell) => {
            *SHELL.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(shell);
            info!("Webshell native layer ready");
            JNI_TRUE
        }
        Err(e) => {
            error!(error = %e, "shell could not start");
            JNI_FALSE
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeStartUrl(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
) -> jstring {
    let url = with_shell(ShellConfig::default().start_url(), |shell| shell.start_url());
    match env.new_string(url) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            error!(error = %e, "could not build start URL string");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeOnDownloadStart(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    url: JString<'_>,
    user_agent: JString<'_>,
    content_disposition: JString<'_>,
    mime_type: JString<'_>,
    content_length: jlong,
) {
    let url = read_string(&mut env, &url);
    let user_agent = read_string(&mut env, &user_agent);
    let content_disposition = read_string(&mut env, &content_disposition);
    let mime_type = read_string(&mut env, &mime_type);

    with_shell((), |shell| {
        // The outcome has already been reported to the user.
        let _ = shell.on_download_start(
            &url,
            &user_agent,
            &content_disposition,
            &mime_type,
            content_length,
        );
    });
}

/// Build an `android.webkit.WebResourceResponse` around `response`.
fn web_resource_response<'local>(
    env: &mut JNIEnv<'local>,
    response: &AssetResponse,
) -> jni::errors::Result<JObject<'local>> {
    let mime = env.new_string(&response.mime_type)?;
    let encoding: JObject = match response.encoding {
        Some(encoding) => env.new_string(encoding)?.into(),
        None => JObject::null(),
    };
    let reason = env.new_string(response.reason)?;
    let headers = env.new_object("java/util/HashMap", "()V", &[])?;
    let body = env.byte_array_from_slice(&response.body)?;
    let stream =
        env.new_object("java/io/ByteArrayInputStream", "([B)V", &[JValue::Object(&body)])?;

    env.new_object(
        "android/webkit/WebResourceResponse",
        "(Ljava/lang/String;Ljava/lang/String;ILjava/lang/String;Ljava/util/Map;Ljava/io/InputStream;)V",
        &[
            JValue::Object(&mime),
            JValue::Object(&encoding),
            JValue::Int(i32::from(response.status)),
            JValue::Object(&reason),
            JValue::Object(&headers),
            JValue::Object(&stream),
        ],
    )
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeShouldIntercept(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    url: JString<'_>,
    is_main_frame: jboolean,
) -> jobject {
    let url = read_string(&mut env, &url);
    let Some(response) = with_shell(None, |shell| {
        shell.intercept_request(&url, is_main_frame != JNI_FALSE)
    }) else {
        return std::ptr::null_mut();
    };

    match web_resource_response(&mut env, &response) {
        Ok(obj) => obj.into_raw(),
        Err(e) => {
            if env.exception_check().unwrap_or(false) {
                let _ = env.exception_clear();
            }
            error!(error = %e, url = %url, "could not build WebResourceResponse");
            std::ptr::null_mut()
        }
    }
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeShouldOverrideUrlLoading(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    url: JString<'_>,
) -> jboolean {
    let url = read_string(&mut env, &url);
    as_jboolean(with_shell(false, |shell| shell.override_url_loading(&url)))
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeOnReceivedError(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    description: JString<'_>,
    failing_url: JString<'_>,
) {
    let description = read_string(&mut env, &description);
    let failing_url = read_string(&mut env, &failing_url);
    with_shell((), |shell| shell.on_received_error(&description, &failing_url));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeOnConsoleMessage(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    level: jint,
    message: JString<'_>,
    source_id: JString<'_>,
    line: jint,
) {
    let message = read_string(&mut env, &message);
    let source_id = read_string(&mut env, &source_id);
    let line = u32::try_from(line).unwrap_or(0);
    with_shell((), |shell| {
        shell.on_console_message(ConsoleLevel::from_ordinal(level), &message, &source_id, line)
    });
}

/// Returns `true` when the view should go back, `false` when the Activity
/// should finish.
#[unsafe(no_mangle)]
pub extern "system" fn Java_dev_webshell_NativeShell_nativeOnBackPressed(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    can_go_back: jboolean,
) -> jboolean {
    let can_go_back = can_go_back != JNI_FALSE;
    let action = with_shell(BackAction::Exit, |shell| shell.on_back_pressed(can_go_back));
    as_jboolean(action == BackAction::GoBack)
}
