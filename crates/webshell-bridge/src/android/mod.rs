// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Android platform bridge via JNI.
//
// Every trait method is reached from a JNI entry point the host invokes, so
// the Activity stored in `ndk_context` is live and the calling thread already
// carries the app class loader. That is what lets us resolve `androidx.*`
// classes with `FindClass`. Most callbacks arrive on the UI thread; the
// request interceptor runs on a WebView background thread and only ever
// reaches `AssetBundle`.

#![cfg(target_os = "android")]

use std::path::{Path, PathBuf};

use jni::objects::{JObject, JObjectArray, JString, JValue};
use jni::JNIEnv;

use webshell_core::error::{Result, ShellError};
use webshell_core::types::NoticeDuration;

use crate::stream::drain_and_close;
use crate::traits::*;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Request code for the storage permission prompt. The host Activity may
/// observe it in `onRequestPermissionsResult`; the shell does not wait for it.
pub const REQUEST_STORAGE_PERMISSION: i32 = 1001;

const WRITE_EXTERNAL_STORAGE: &str = "android.permission.WRITE_EXTERNAL_STORAGE";

/// `Build.VERSION_CODES.TIRAMISU`. From this release on, the app's own output
/// needs no storage grant.
const SDK_TIRAMISU: i32 = 33;

/// `Environment.DIRECTORY_DOWNLOADS`.
const DIRECTORY_DOWNLOADS: &str = "Download";

const PERMISSION_GRANTED: i32 = 0;
const FLAG_GRANT_READ_URI_PERMISSION: i32 = 0x0000_0001;
const TOAST_LENGTH_SHORT: i32 = 0;
const TOAST_LENGTH_LONG: i32 = 1;

// ---------------------------------------------------------------------------
// JNI bootstrap helpers
// ---------------------------------------------------------------------------

/// Run `f` with an attached [`JNIEnv`] and the hosting Activity.
///
/// Any Java exception left pending by a failed call is cleared before
/// returning so the next JNI call starts from a clean state.
fn with_activity<T>(f: impl FnOnce(&mut JNIEnv<'_>, &JObject<'_>) -> Result<T>) -> Result<T> {
    let ctx = ndk_context::android_context();
    // SAFETY: `ctx.vm()` is the `JavaVM*` registered by the NDK glue and
    // stays valid for the lifetime of the process.
    let vm = unsafe { jni::JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| ShellError::Bridge(format!("failed to obtain JavaVM: {e}")))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| ShellError::Bridge(format!("failed to attach JNI thread: {e}")))?;

    let ptr = ctx.context();
    if ptr.is_null() {
        return Err(ShellError::Bridge(
            "Android context is null, activity not initialised".into(),
        ));
    }
    // SAFETY: the pointer is a global reference to the hosting Activity.
    let activity = unsafe { JObject::from_raw(ptr.cast()) };

    let result = f(&mut env, &activity);
    if result.is_err() && env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }
    result
}

/// Convenience: map any `jni::errors::Error` into `ShellError::Bridge`.
fn jni_err(context: &str, e: jni::errors::Error) -> ShellError {
    ShellError::Bridge(format!("{context}: {e}"))
}

fn sdk_int(env: &mut JNIEnv<'_>) -> Result<i32> {
    env.get_static_field("android/os/Build$VERSION", "SDK_INT", "I")
        .map_err(|e| jni_err("Build.VERSION.SDK_INT", e))?
        .i()
        .map_err(|e| jni_err("SDK_INT->i", e))
}

/// `file.getAbsolutePath()` as a Rust path.
fn absolute_path(env: &mut JNIEnv<'_>, file: &JObject<'_>) -> Result<PathBuf> {
    let j_path: JObject = env
        .call_method(file, "getAbsolutePath", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("File.getAbsolutePath", e))?
        .l()
        .map_err(|e| jni_err("getAbsolutePath->l", e))?;
    let path: String = env
        .get_string(&JString::from(j_path))
        .map_err(|e| jni_err("get_string(path)", e))?
        .into();
    Ok(PathBuf::from(path))
}

/// `<package>.fileprovider`, the authority declared in the host manifest.
fn file_provider_authority(env: &mut JNIEnv<'_>, activity: &JObject<'_>) -> Result<String> {
    let j_pkg: JObject = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .map_err(|e| jni_err("getPackageName", e))?
        .l()
        .map_err(|e| jni_err("getPackageName->l", e))?;

    let pkg: String = env
        .get_string(&JString::from(j_pkg))
        .map_err(|e| jni_err("get_string(packageName)", e))?
        .into();

    Ok(format!("{pkg}.fileprovider"))
}

/// Build an `ACTION_VIEW` intent for `uri`, optionally with an explicit type.
fn view_intent<'local>(
    env: &mut JNIEnv<'local>,
    uri: &JObject<'_>,
    mime_type: Option<&str>,
) -> Result<JObject<'local>> {
    let j_action: JString = env
        .new_string("android.intent.action.VIEW")
        .map_err(|e| jni_err("new_string(ACTION_VIEW)", e))?;

    let intent = env
        .new_object(
            "android/content/Intent",
            "(Ljava/lang/String;)V",
            &[JValue::Object(&j_action)],
        )
        .map_err(|e| jni_err("new Intent", e))?;

    match mime_type {
        Some(mime) => {
            let j_mime: JString = env
                .new_string(mime)
                .map_err(|e| jni_err("new_string(mime_type)", e))?;
            env.call_method(
                &intent,
                "setDataAndType",
                "(Landroid/net/Uri;Ljava/lang/String;)Landroid/content/Intent;",
                &[JValue::Object(uri), JValue::Object(&j_mime)],
            )
            .map_err(|e| jni_err("setDataAndType", e))?;
        }
        None => {
            env.call_method(
                &intent,
                "setData",
                "(Landroid/net/Uri;)Landroid/content/Intent;",
                &[JValue::Object(uri)],
            )
            .map_err(|e| jni_err("setData", e))?;
        }
    }

    Ok(intent)
}

/// `activity.startActivity(intent)`, mapping `ActivityNotFoundException` to
/// [`ShellError::NoViewerAvailable`].
fn start_activity(
    env: &mut JNIEnv<'_>,
    activity: &JObject<'_>,
    intent: &JObject<'_>,
    target: &str,
) -> Result<()> {
    match env.call_method(
        activity,
        "startActivity",
        "(Landroid/content/Intent;)V",
        &[JValue::Object(intent)],
    ) {
        Ok(_) => Ok(()),
        Err(jni::errors::Error::JavaException) => {
            let _ = env.exception_clear();
            tracing::warn!(target, "Android: no activity can handle the intent");
            Err(ShellError::NoViewerAvailable(target.to_owned()))
        }
        Err(e) => Err(jni_err("startActivity", e)),
    }
}

// ---------------------------------------------------------------------------
// Bridge struct
// ---------------------------------------------------------------------------

/// Android implementation of the Webshell platform bridge.
///
/// The struct is zero-sized; all state lives on the Java side.
pub struct AndroidBridge;

impl AndroidBridge {
    /// Create a new Android bridge.
    ///
    /// This does **not** touch JNI; the first JNI call happens lazily when
    /// a trait method is invoked.
    pub fn new() -> Self {
        Self
    }
}

impl Default for AndroidBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformBridge for AndroidBridge {
    fn platform_name(&self) -> &str {
        "Android"
    }
}

// ---------------------------------------------------------------------------
// StorageAuthorization: WRITE_EXTERNAL_STORAGE
// ---------------------------------------------------------------------------

impl StorageAuthorization for AndroidBridge {
    fn requires_explicit_storage_grant(&self) -> bool {
        match with_activity(|env, _| sdk_int(env)) {
            Ok(sdk) => sdk < SDK_TIRAMISU,
            Err(e) => {
                // Asking needlessly is harmless; writing without a grant is not.
                tracing::warn!(error = %e, "Android: SDK level unknown, assuming grant required");
                true
            }
        }
    }

    fn has_storage_grant(&self) -> bool {
        let granted = with_activity(|env, activity| {
            let j_perm: JString = env
                .new_string(WRITE_EXTERNAL_STORAGE)
                .map_err(|e| jni_err("new_string(permission)", e))?;
            env.call_static_method(
                "androidx/core/content/ContextCompat",
                "checkSelfPermission",
                "(Landroid/content/Context;Ljava/lang/String;)I",
                &[JValue::Object(activity), JValue::Object(&j_perm)],
            )
            .map_err(|e| jni_err("ContextCompat.checkSelfPermission", e))?
            .i()
            .map_err(|e| jni_err("checkSelfPermission->i", e))
        });

        match granted {
            Ok(code) => code == PERMISSION_GRANTED,
            Err(e) => {
                tracing::warn!(error = %e, "Android: permission check failed");
                false
            }
        }
    }

    fn request_storage_grant(&self) -> Result<()> {
        with_activity(|env, activity| {
            tracing::info!("Android: requesting WRITE_EXTERNAL_STORAGE");

            let string_class = env
                .find_class("java/lang/String")
                .map_err(|e| jni_err("find_class(String)", e))?;
            let j_perm: JString = env
                .new_string(WRITE_EXTERNAL_STORAGE)
                .map_err(|e| jni_err("new_string(permission)", e))?;
            let permissions: JObjectArray = env
                .new_object_array(1, &string_class, &j_perm)
                .map_err(|e| jni_err("new_object_array(permissions)", e))?;

            env.call_static_method(
                "androidx/core/app/ActivityCompat",
                "requestPermissions",
                "(Landroid/app/Activity;[Ljava/lang/String;I)V",
                &[
                    JValue::Object(activity),
                    JValue::Object(&permissions),
                    JValue::Int(REQUEST_STORAGE_PERMISSION),
                ],
            )
            .map_err(|e| jni_err("ActivityCompat.requestPermissions", e))?;
            Ok(())
        })
    }
}

// ---------------------------------------------------------------------------
// StorageLocations: Environment / Context.getExternalFilesDir
// ---------------------------------------------------------------------------

impl StorageLocations for AndroidBridge {
    fn public_downloads_dir(&self) -> Result<PathBuf> {
        with_activity(|env, _| {
            let j_type: JString = env
                .new_string(DIRECTORY_DOWNLOADS)
                .map_err(|e| jni_err("new_string(DIRECTORY_DOWNLOADS)", e))?;
            let dir: JObject = env
                .call_static_method(
                    "android/os/Environment",
                    "getExternalStoragePublicDirectory",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&j_type)],
                )
                .map_err(|e| jni_err("getExternalStoragePublicDirectory", e))?
                .l()
                .map_err(|e| jni_err("getExternalStoragePublicDirectory->l", e))?;
            absolute_path(env, &dir)
        })
    }

    fn private_downloads_dir(&self) -> Result<PathBuf> {
        with_activity(|env, activity| {
            let j_type: JString = env
                .new_string(DIRECTORY_DOWNLOADS)
                .map_err(|e| jni_err("new_string(DIRECTORY_DOWNLOADS)", e))?;
            let dir: JObject = env
                .call_method(
                    activity,
                    "getExternalFilesDir",
                    "(Ljava/lang/String;)Ljava/io/File;",
                    &[JValue::Object(&j_type)],
                )
                .map_err(|e| jni_err("getExternalFilesDir", e))?
                .l()
                .map_err(|e| jni_err("getExternalFilesDir->l", e))?;
            if dir.is_null() {
                return Err(ShellError::Bridge(
                    "external files directory unavailable (storage not mounted)".into(),
                ));
            }
            absolute_path(env, &dir)
        })
    }
}

// ---------------------------------------------------------------------------
// ExternalViewer: Intent.ACTION_VIEW
// ---------------------------------------------------------------------------

impl ExternalViewer for AndroidBridge {
    /// Open a saved file through `FileProvider` so the receiving app gets a
    /// readable `content://` URI rather than a raw path.
    fn open_file(&self, path: &Path, mime_type: &str) -> Result<()> {
        let display = path.display().to_string();
        with_activity(|env, activity| {
            tracing::info!(path = %display, mime = mime_type, "Android: launching view intent");

            let j_path: JString = env
                .new_string(&display)
                .map_err(|e| jni_err("new_string(path)", e))?;
            let file_obj = env
                .new_object(
                    "java/io/File",
                    "(Ljava/lang/String;)V",
                    &[JValue::Object(&j_path)],
                )
                .map_err(|e| jni_err("new File(path)", e))?;

            let authority = file_provider_authority(env, activity)?;
            let j_authority: JString = env
                .new_string(&authority)
                .map_err(|e| jni_err("new_string(authority)", e))?;

            let content_uri: JObject = env
                .call_static_method(
                    "androidx/core/content/FileProvider",
                    "getUriForFile",
                    "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
                    &[
                        JValue::Object(activity),
                        JValue::Object(&j_authority),
                        JValue::Object(&file_obj),
                    ],
                )
                .map_err(|e| jni_err("FileProvider.getUriForFile", e))?
                .l()
                .map_err(|e| jni_err("getUriForFile->l", e))?;

            let intent = view_intent(env, &content_uri, Some(mime_type))?;
            env.call_method(
                &intent,
                "addFlags",
                "(I)Landroid/content/Intent;",
                &[JValue::Int(FLAG_GRANT_READ_URI_PERMISSION)],
            )
            .map_err(|e| jni_err("addFlags", e))?;

            start_activity(env, activity, &intent, &display)
        })
    }

    fn open_uri(&self, uri: &str) -> Result<()> {
        with_activity(|env, activity| {
            tracing::info!(uri, "Android: handing URI to external app");

            let j_uri_str: JString = env
                .new_string(uri)
                .map_err(|e| jni_err("new_string(uri)", e))?;
            let uri_obj: JObject = env
                .call_static_method(
                    "android/net/Uri",
                    "parse",
                    "(Ljava/lang/String;)Landroid/net/Uri;",
                    &[JValue::Object(&j_uri_str)],
                )
                .map_err(|e| jni_err("Uri.parse", e))?
                .l()
                .map_err(|e| jni_err("Uri.parse->l", e))?;

            let intent = view_intent(env, &uri_obj, None)?;
            start_activity(env, activity, &intent, uri)
        })
    }
}

// ---------------------------------------------------------------------------
// UserNotice: android.widget.Toast
// ---------------------------------------------------------------------------

impl UserNotice for AndroidBridge {
    fn show_notice(&self, message: &str, duration: NoticeDuration) {
        let length = match duration {
            NoticeDuration::Short => TOAST_LENGTH_SHORT,
            NoticeDuration::Long => TOAST_LENGTH_LONG,
        };

        let shown = with_activity(|env, activity| {
            let j_text: JString = env
                .new_string(message)
                .map_err(|e| jni_err("new_string(toast)", e))?;
            let toast: JObject = env
                .call_static_method(
                    "android/widget/Toast",
                    "makeText",
                    "(Landroid/content/Context;Ljava/lang/CharSequence;I)Landroid/widget/Toast;",
                    &[
                        JValue::Object(activity),
                        JValue::Object(&j_text),
                        JValue::Int(length),
                    ],
                )
                .map_err(|e| jni_err("Toast.makeText", e))?
                .l()
                .map_err(|e| jni_err("makeText->l", e))?;
            env.call_method(&toast, "show", "()V", &[])
                .map_err(|e| jni_err("Toast.show", e))?;
            Ok(())
        });

        if let Err(e) = shown {
            tracing::warn!(error = %e, message, "Android: toast failed");
        }
    }
}

// ---------------------------------------------------------------------------
// AssetBundle: android.content.res.AssetManager
// ---------------------------------------------------------------------------

impl AssetBundle for AndroidBridge {
    /// Read `relative_path` from the APK's `assets/` directory.
    ///
    /// `AssetManager.open` throws `FileNotFoundException` for missing
    /// entries; that is reported as `Ok(None)`.
    fn read_asset(&self, relative_path: &str) -> Result<Option<Vec<u8>>> {
        with_activity(|env, activity| {
            let assets: JObject = env
                .call_method(
                    activity,
                    "getAssets",
                    "()Landroid/content/res/AssetManager;",
                    &[],
                )
                .map_err(|e| jni_err("getAssets", e))?
                .l()
                .map_err(|e| jni_err("getAssets->l", e))?;

            let j_name: JString = env
                .new_string(relative_path)
                .map_err(|e| jni_err("new_string(asset)", e))?;
            let buffer = env
                .new_byte_array(8192)
                .map_err(|e| jni_err("new_byte_array", e))?;

            let stream: JObject = match env.call_method(
                &assets,
                "open",
                "(Ljava/lang/String;)Ljava/io/InputStream;",
                &[JValue::Object(&j_name)],
            ) {
                Ok(value) => value.l().map_err(|e| jni_err("AssetManager.open->l", e))?,
                Err(jni::errors::Error::JavaException) => {
                    let _ = env.exception_clear();
                    return Ok(None);
                }
                Err(e) => return Err(jni_err("AssetManager.open", e)),
            };

            let mut chunk = vec![0i8; 8192];
            let bytes = drain_and_close(
                env,
                |env, bytes| {
                    let n = env
                        .call_method(&stream, "read", "([B)I", &[JValue::Object(&buffer)])
                        .map_err(|e| jni_err("InputStream.read", e))?
                        .i()
                        .map_err(|e| jni_err("read->i", e))?;
                    if n < 0 {
                        return Ok(false);
                    }
                    let n = n as usize;
                    env.get_byte_array_region(&buffer, 0, &mut chunk[..n])
                        .map_err(|e| jni_err("get_byte_array_region", e))?;
                    bytes.extend(chunk[..n].iter().map(|b| *b as u8));
                    Ok(true)
                },
                |env| {
                    // A failed read leaves its exception pending.
                    if env.exception_check().unwrap_or(false) {
                        let _ = env.exception_clear();
                    }
                    env.call_method(&stream, "close", "()V", &[])
                        .map(|_| ())
                        .map_err(|e| {
                            let _ = env.exception_clear();
                            jni_err("InputStream.close", e)
                        })
                },
            )?;

            tracing::debug!(asset = relative_path, bytes = bytes.len(), "Android: asset read");
            Ok(Some(bytes))
        })
    }
}
